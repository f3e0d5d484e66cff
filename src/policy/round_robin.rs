use super::ReplacementPolicy;
use crate::coremap::{FrameIndex, Residents};

/// Evicts frames in index order, wrapping around
#[derive(Debug, Default)]
pub struct RoundRobinPolicy {
    next: usize,
    memsize: usize,
}

impl RoundRobinPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for RoundRobinPolicy {
    fn init(&mut self, memsize: usize) {
        self.memsize = memsize;
        self.next = 0;
    }

    fn reference(&mut self, _frame: FrameIndex) {}

    fn evict(&mut self, _residents: &mut Residents<'_>) -> Option<FrameIndex> {
        if self.memsize == 0 {
            return None;
        }
        let victim = self.next;
        self.next = (self.next + 1) % self.memsize;
        Some(FrameIndex(victim))
    }

    fn cleanup(&mut self) {}

    fn name(&self) -> &'static str {
        "rr"
    }
}
