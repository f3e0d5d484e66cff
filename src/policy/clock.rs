use super::ReplacementPolicy;
use crate::coremap::{FrameIndex, Residents};

/// Second-chance replacement. The hand sweeps the frames, clearing the
/// REFERENCED bit of each page it passes, and stops at the first page whose
/// bit was already clear. References are recorded in the page table entry
/// during translation, so `reference` has nothing to do.
#[derive(Debug, Default)]
pub struct ClockPolicy {
    hand: usize,
    memsize: usize,
}

impl ClockPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hand(&self) -> FrameIndex {
        FrameIndex(self.hand)
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.memsize;
    }
}

impl ReplacementPolicy for ClockPolicy {
    fn init(&mut self, memsize: usize) {
        self.memsize = memsize;
        self.hand = 0;
    }

    fn reference(&mut self, _frame: FrameIndex) {}

    fn evict(&mut self, residents: &mut Residents<'_>) -> Option<FrameIndex> {
        if self.memsize == 0 {
            return None;
        }
        // At most one full sweep clears every bit, so this ends within two.
        loop {
            let frame = FrameIndex(self.hand);
            if residents.is_referenced(frame) {
                residents.clear_referenced(frame);
                self.advance();
            } else {
                self.advance();
                return Some(frame);
            }
        }
    }

    fn cleanup(&mut self) {}

    fn name(&self) -> &'static str {
        "clock"
    }
}
