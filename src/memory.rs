use crate::constants::*;
use crate::coremap::FrameIndex;

/// Simulated physical memory: `memsize` frames of `SIM_PAGE_SIZE` bytes
pub struct PhysicalMemory {
    data: Box<[u8]>,
}

impl PhysicalMemory {
    /// Create a new physical memory initialized to all zeros
    pub fn new(frames: usize) -> Self {
        PhysicalMemory { data: vec![0u8; frames * SIM_PAGE_SIZE].into_boxed_slice() }
    }

    pub fn frames(&self) -> usize {
        self.data.len() / SIM_PAGE_SIZE
    }

    /// Read a byte from physical memory
    #[inline]
    pub fn read(&self, address: usize) -> u8 {
        self.data[address]
    }

    /// Write a byte to physical memory
    #[inline]
    pub fn write(&mut self, address: usize, value: u8) {
        self.data[address] = value;
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(frame: FrameIndex) -> usize {
        frame.0 * SIM_PAGE_SIZE
    }

    pub fn frame(&self, frame: FrameIndex) -> &[u8] {
        let start = Self::frame_to_address(frame);
        &self.data[start..start + SIM_PAGE_SIZE]
    }

    pub fn frame_mut(&mut self, frame: FrameIndex) -> &mut [u8] {
        let start = Self::frame_to_address(frame);
        &mut self.data[start..start + SIM_PAGE_SIZE]
    }

    /// Clear a frame before handing it to a page that has never been touched
    pub fn zero_frame(&mut self, frame: FrameIndex) {
        self.frame_mut(frame).fill(0);
    }

    pub fn footprint_bytes(&self) -> usize {
        self.data.len()
    }
}
