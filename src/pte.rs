//! Leaf page table entries.
//!
//! Residency is a tagged state rather than bits packed next to the frame
//! number: an entry is either unmapped, resident in a frame, or on swap.
//! VALID and ONSWAP fall out of that state; only DIRTY and REFERENCED are
//! independent flags.

use bitflags::bitflags;

use crate::coremap::FrameIndex;
use crate::swap::SwapOffset;

bitflags! {
    /// Status bits that vary independently of residency
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PteFlags: u8 {
        /// Written since it last became resident
        const DIRTY = 1 << 0;
        /// Accessed since the bit was last cleared
        const REFERENCED = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Residency {
    /// Never touched
    #[default]
    Unmapped,
    /// Data lives in `frame`. `swap_slot` is the slot this page was last
    /// paged out to; it is reused on the next pageout but holds stale data.
    Resident {
        frame: FrameIndex,
        swap_slot: Option<SwapOffset>,
    },
    /// Data lives only in the swap store at `offset`
    OnSwap { offset: SwapOffset },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    residency: Residency,
    flags: PteFlags,
}

impl PageTableEntry {
    pub fn residency(&self) -> Residency {
        self.residency
    }

    pub fn flags(&self) -> PteFlags {
        self.flags
    }

    /// Address-translatable: the page occupies a frame
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self.residency, Residency::Resident { .. })
    }

    #[inline]
    pub fn is_on_swap(&self) -> bool {
        matches!(self.residency, Residency::OnSwap { .. })
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.flags.contains(PteFlags::DIRTY)
    }

    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.flags.contains(PteFlags::REFERENCED)
    }

    pub fn set_referenced(&mut self, val: bool) {
        self.flags.set(PteFlags::REFERENCED, val);
    }

    pub fn set_dirty(&mut self, val: bool) {
        self.flags.set(PteFlags::DIRTY, val);
    }

    /// Frame holding the page, if resident
    pub fn frame(&self) -> Option<FrameIndex> {
        match self.residency {
            Residency::Resident { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Where the page's data sits in swap, if it is not resident
    pub fn swap_offset(&self) -> Option<SwapOffset> {
        match self.residency {
            Residency::OnSwap { offset } => Some(offset),
            _ => None,
        }
    }

    /// Slot the next pageout should write to
    pub fn swap_slot(&self) -> Option<SwapOffset> {
        match self.residency {
            Residency::Resident { swap_slot, .. } => swap_slot,
            Residency::OnSwap { offset } => Some(offset),
            Residency::Unmapped => None,
        }
    }

    /// Map the page into `frame`, keeping whatever swap slot it already owns
    pub fn make_resident(&mut self, frame: FrameIndex) {
        let swap_slot = self.swap_slot();
        self.residency = Residency::Resident { frame, swap_slot };
    }

    /// Record that the page was written to swap at `offset` and lost its frame
    pub fn move_to_swap(&mut self, offset: SwapOffset) {
        self.residency = Residency::OnSwap { offset };
        self.flags.remove(PteFlags::DIRTY);
    }
}
