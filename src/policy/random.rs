use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ReplacementPolicy;
use crate::coremap::{FrameIndex, Residents};

/// Evicts a uniformly random frame. Seeded, so a run is repeatable.
#[derive(Debug)]
pub struct RandomPolicy {
    seed: u64,
    rng: StdRng,
    memsize: usize,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        RandomPolicy { seed, rng: StdRng::seed_from_u64(seed), memsize: 0 }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn init(&mut self, memsize: usize) {
        self.memsize = memsize;
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn reference(&mut self, _frame: FrameIndex) {}

    fn evict(&mut self, _residents: &mut Residents<'_>) -> Option<FrameIndex> {
        if self.memsize == 0 {
            return None;
        }
        Some(FrameIndex(self.rng.gen_range(0..self.memsize)))
    }

    fn cleanup(&mut self) {}

    fn name(&self) -> &'static str {
        "rand"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coremap::Coremap;
    use crate::pagetable::PageTable;

    fn victims(seed: u64, memsize: usize, n: usize) -> Vec<FrameIndex> {
        let cm = Coremap::new(memsize);
        let mut pt = PageTable::new();
        let mut policy = RandomPolicy::new(seed);
        policy.init(memsize);
        (0..n)
            .map(|_| policy.evict(&mut Residents::new(&cm, &mut pt)).unwrap())
            .collect()
    }

    #[test]
    fn test_victims_in_range() {
        assert!(victims(7, 5, 200).iter().all(|f| f.0 < 5));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        assert_eq!(victims(42, 8, 50), victims(42, 8, 50));
    }

    #[test]
    fn test_init_restarts_sequence() {
        let cm = Coremap::new(8);
        let mut pt = PageTable::new();
        let mut policy = RandomPolicy::new(3);
        policy.init(8);
        let first: Vec<_> = (0..10).map(|_| policy.evict(&mut Residents::new(&cm, &mut pt))).collect();
        policy.init(8);
        let second: Vec<_> = (0..10).map(|_| policy.evict(&mut Residents::new(&cm, &mut pt))).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uninitialized_has_no_victim() {
        let cm = Coremap::new(0);
        let mut pt = PageTable::new();
        let mut policy = RandomPolicy::new(1);
        assert_eq!(policy.evict(&mut Residents::new(&cm, &mut pt)), None);
    }
}
