//! Page replacement policies.
//!
//! Four interchangeable strategies share one contract:
//! - Random: uniform choice over all frames
//! - RoundRobin: cursor over frames, FIFO for a workload that never unmaps
//! - Clock: second chance using the pages' REFERENCED bits
//! - Lru: exact least-recently-used via an index-linked recency list
//!
//! `evict` is only called when every frame is in use.

mod clock;
mod lru;
mod random;
mod round_robin;

pub use clock::ClockPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;
pub use round_robin::RoundRobinPolicy;

use std::fmt;
use std::str::FromStr;

use crate::coremap::{FrameIndex, Residents};
use crate::error::SimError;

/// Trait for page replacement policies
pub trait ReplacementPolicy {
    /// Prepare for a run over `memsize` frames
    fn init(&mut self, memsize: usize);

    /// Called after every translation with the frame that served it
    fn reference(&mut self, frame: FrameIndex);

    /// Pick a frame to vacate. `None` means the policy has nothing to offer.
    fn evict(&mut self, residents: &mut Residents<'_>) -> Option<FrameIndex>;

    /// Release per-run state
    fn cleanup(&mut self);

    fn name(&self) -> &'static str;
}

/// Replacement algorithm selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Random,
    RoundRobin,
    Clock,
    Lru,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [Algorithm::Random, Algorithm::RoundRobin, Algorithm::Clock, Algorithm::Lru];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Random => "rand",
            Algorithm::RoundRobin => "rr",
            Algorithm::Clock => "clock",
            Algorithm::Lru => "lru",
        }
    }
}

impl FromStr for Algorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| SimError::UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The active policy. Chosen once per run.
#[derive(Debug)]
pub enum Policy {
    Random(RandomPolicy),
    RoundRobin(RoundRobinPolicy),
    Clock(ClockPolicy),
    Lru(LruPolicy),
}

impl Policy {
    /// Build the policy for `algorithm`. `seed` only matters for Random.
    pub fn new(algorithm: Algorithm, seed: u64) -> Self {
        match algorithm {
            Algorithm::Random => Policy::Random(RandomPolicy::new(seed)),
            Algorithm::RoundRobin => Policy::RoundRobin(RoundRobinPolicy::new()),
            Algorithm::Clock => Policy::Clock(ClockPolicy::new()),
            Algorithm::Lru => Policy::Lru(LruPolicy::new()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Policy::Random(_) => Algorithm::Random,
            Policy::RoundRobin(_) => Algorithm::RoundRobin,
            Policy::Clock(_) => Algorithm::Clock,
            Policy::Lru(_) => Algorithm::Lru,
        }
    }

    fn inner(&mut self) -> &mut dyn ReplacementPolicy {
        match self {
            Policy::Random(p) => p,
            Policy::RoundRobin(p) => p,
            Policy::Clock(p) => p,
            Policy::Lru(p) => p,
        }
    }
}

impl ReplacementPolicy for Policy {
    fn init(&mut self, memsize: usize) {
        self.inner().init(memsize);
    }

    fn reference(&mut self, frame: FrameIndex) {
        self.inner().reference(frame);
    }

    fn evict(&mut self, residents: &mut Residents<'_>) -> Option<FrameIndex> {
        self.inner().evict(residents)
    }

    fn cleanup(&mut self) {
        self.inner().cleanup();
    }

    fn name(&self) -> &'static str {
        self.algorithm().name()
    }
}
