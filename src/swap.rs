//! Backing store for evicted pages.
//!
//! Offsets are byte offsets into the store and always a multiple of
//! [`SIM_PAGE_SIZE`]. An offset handed out by `pageout` stays valid for the
//! rest of the run; the page that owns it writes back to the same slot on
//! every later eviction.

use std::fmt;

use crate::constants::SIM_PAGE_SIZE;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapOffset(pub u64);

impl SwapOffset {
    #[inline]
    pub fn from_slot(slot: usize) -> Self {
        SwapOffset((slot * SIM_PAGE_SIZE) as u64)
    }

    #[inline]
    pub fn slot(&self) -> usize {
        self.0 as usize / SIM_PAGE_SIZE
    }
}

impl fmt::Display for SwapOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The two primitives the eviction path needs from a backing store.
pub trait SwapStore {
    /// Write `frame` out. `current` is the slot the page already owns, if any.
    /// Returns the offset the page now lives at, or `None` when the store is full.
    fn pageout(&mut self, frame: &[u8], current: Option<SwapOffset>) -> Option<SwapOffset>;

    /// Fill `frame` from a slot previously returned by `pageout`.
    fn pagein(&mut self, frame: &mut [u8], offset: SwapOffset) -> Result<()>;

    /// Number of page slots the store can hold
    fn capacity(&self) -> usize;

    /// Bytes held by the store, for the run-end footprint
    fn footprint_bytes(&self) -> usize {
        self.capacity() * SIM_PAGE_SIZE
    }
}

/// Swap space kept in a flat byte vector, one `SIM_PAGE_SIZE` block per slot
pub struct MemorySwap {
    data: Vec<u8>,
    used: Vec<bool>,
    next_free: usize,
}

impl MemorySwap {
    /// Create a store of `pages` zeroed slots
    pub fn new(pages: usize) -> Self {
        MemorySwap {
            data: vec![0u8; pages * SIM_PAGE_SIZE],
            used: vec![false; pages],
            next_free: 0,
        }
    }

    /// Slots handed out so far
    pub fn used_slots(&self) -> usize {
        self.used.iter().filter(|&&u| u).count()
    }

    fn allocate_slot(&mut self) -> Option<usize> {
        let slot = (self.next_free..self.used.len()).find(|&s| !self.used[s])?;
        self.used[slot] = true;
        self.next_free = slot + 1;
        Some(slot)
    }

    fn block(&self, slot: usize) -> &[u8] {
        let start = slot * SIM_PAGE_SIZE;
        &self.data[start..start + SIM_PAGE_SIZE]
    }

    fn block_mut(&mut self, slot: usize) -> &mut [u8] {
        let start = slot * SIM_PAGE_SIZE;
        &mut self.data[start..start + SIM_PAGE_SIZE]
    }

    fn is_allocated(&self, offset: SwapOffset) -> bool {
        offset.0 % SIM_PAGE_SIZE as u64 == 0 && self.used.get(offset.slot()).copied().unwrap_or(false)
    }
}

impl SwapStore for MemorySwap {
    fn pageout(&mut self, frame: &[u8], current: Option<SwapOffset>) -> Option<SwapOffset> {
        let slot = match current {
            Some(offset) if self.is_allocated(offset) => offset.slot(),
            _ => self.allocate_slot()?,
        };
        self.block_mut(slot).copy_from_slice(&frame[..SIM_PAGE_SIZE]);
        Some(SwapOffset::from_slot(slot))
    }

    fn pagein(&mut self, frame: &mut [u8], offset: SwapOffset) -> Result<()> {
        if !self.is_allocated(offset) {
            return Err(SimError::UnknownSwapOffset(offset));
        }
        frame[..SIM_PAGE_SIZE].copy_from_slice(self.block(offset.slot()));
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.used.len()
    }
}
