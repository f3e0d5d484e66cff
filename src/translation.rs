use std::fmt;

use crate::constants::*;

/// Represents the decomposed components of a Virtual Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub raw: u64,
    pub top: usize,
    pub mid: usize,
    pub bottom: usize,
    pub offset: usize,
}

impl VirtualAddress {
    /// Decompose a raw VA into its components
    pub fn from_raw(raw: u64) -> Self {
        let top = ((raw >> TOP_SHIFT) & INDEX_MASK) as usize;
        let mid = ((raw >> MID_SHIFT) & INDEX_MASK) as usize;
        let bottom = ((raw >> BOT_SHIFT) & INDEX_MASK) as usize;
        let offset = (raw & OFFSET_MASK) as usize;

        VirtualAddress { raw, top, mid, bottom, offset }
    }

    /// Virtual page number rebuilt from the three table indices (36 bits)
    #[inline]
    pub fn vpn(&self) -> u64 {
        ((self.top as u64) << (2 * TABLE_BITS)) | ((self.mid as u64) << TABLE_BITS) | self.bottom as u64
    }

    /// Whether the in-page offset falls inside the bytes a simulated frame holds
    #[inline]
    pub fn offset_in_frame(&self) -> bool {
        self.offset < SIM_PAGE_SIZE
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VA({:#x}) = (top={}, mid={}, bot={}, off={})",
            self.raw, self.top, self.mid, self.bottom, self.offset
        )
    }
}

/// Kind of memory reference recorded in a trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Instruction,
    Load,
    Store,
    Modify,
}

impl AccessType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(AccessType::Instruction),
            'L' => Some(AccessType::Load),
            'S' => Some(AccessType::Store),
            'M' => Some(AccessType::Modify),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            AccessType::Instruction => 'I',
            AccessType::Load => 'L',
            AccessType::Store => 'S',
            AccessType::Modify => 'M',
        }
    }

    /// Stores and modifies write the page and make it dirty
    #[inline]
    pub fn is_write(&self) -> bool {
        matches!(self, AccessType::Store | AccessType::Modify)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
