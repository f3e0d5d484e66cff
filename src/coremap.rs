//! Frame table: which page, if any, occupies each physical frame.

use std::fmt;

use crate::pagetable::{PageTable, PteRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(pub usize);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One physical frame. In use exactly when it has an occupant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    occupant: Option<PteRef>,
}

impl Frame {
    #[inline]
    pub fn in_use(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<PteRef> {
        self.occupant
    }
}

pub struct Coremap {
    frames: Vec<Frame>,
}

impl Coremap {
    pub fn new(memsize: usize) -> Self {
        Coremap { frames: vec![Frame::default(); memsize] }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Lowest-numbered frame nobody occupies
    pub fn find_free(&self) -> Option<FrameIndex> {
        self.frames.iter().position(|f| !f.in_use()).map(FrameIndex)
    }

    /// Page held by `frame`, or `None` if free or out of range
    pub fn occupant(&self, frame: FrameIndex) -> Option<PteRef> {
        self.frames.get(frame.0).and_then(|f| f.occupant)
    }

    /// Hand `frame` to the page behind `pte`
    pub fn claim(&mut self, frame: FrameIndex, pte: PteRef) {
        debug_assert!(!self.frames[frame.0].in_use(), "frame {} claimed twice", frame);
        self.frames[frame.0].occupant = Some(pte);
    }

    pub fn release(&mut self, frame: FrameIndex) {
        self.frames[frame.0].occupant = None;
    }

    pub fn in_use_count(&self) -> usize {
        self.frames.iter().filter(|f| f.in_use()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &Frame)> + '_ {
        self.frames.iter().enumerate().map(|(i, f)| (FrameIndex(i), f))
    }

    pub fn footprint_bytes(&self) -> usize {
        self.frames.len() * std::mem::size_of::<Frame>()
    }
}

/// What a replacement policy may see of the resident pages while choosing a victim
pub struct Residents<'a> {
    coremap: &'a Coremap,
    page_table: &'a mut PageTable,
}

impl<'a> Residents<'a> {
    pub fn new(coremap: &'a Coremap, page_table: &'a mut PageTable) -> Self {
        Residents { coremap, page_table }
    }

    pub fn frame_count(&self) -> usize {
        self.coremap.len()
    }

    /// REFERENCED bit of the page in `frame`. Free frames read as unreferenced.
    pub fn is_referenced(&self, frame: FrameIndex) -> bool {
        self.coremap
            .occupant(frame)
            .is_some_and(|r| self.page_table.entry(r).is_referenced())
    }

    pub fn clear_referenced(&mut self, frame: FrameIndex) {
        if let Some(r) = self.coremap.occupant(frame) {
            self.page_table.entry_mut(r).set_referenced(false);
        }
    }
}
