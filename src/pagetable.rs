//! Three-level page table.
//!
//! Tables live in two arenas: directories (top and mid levels) and leaf
//! tables. A directory slot holds the arena index of its child, so "sub-table
//! exists" is simply `Some`. Tables are created the first time a walk passes
//! through an empty slot and are never freed before the table is dropped.

use std::fmt;

use crate::constants::*;
use crate::pte::{PageTableEntry, Residency};
use crate::translation::VirtualAddress;

/// Handle to one leaf entry: which leaf table, and which slot in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PteRef {
    leaf: u32,
    index: u16,
}

impl PteRef {
    pub fn leaf(&self) -> usize {
        self.leaf as usize
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

struct Directory {
    slots: Box<[Option<u32>]>,
}

impl Directory {
    fn new() -> Self {
        Directory { slots: vec![None; TABLE_LEN].into_boxed_slice() }
    }
}

struct LeafTable {
    entries: Box<[PageTableEntry]>,
}

impl LeafTable {
    fn new() -> Self {
        LeafTable { entries: vec![PageTableEntry::default(); TABLE_LEN].into_boxed_slice() }
    }
}

const ROOT: usize = 0;

pub struct PageTable {
    // directories[ROOT] is the top level; every other directory is a mid level
    directories: Vec<Directory>,
    leaves: Vec<LeafTable>,
    // vpn prefix (top, mid) that owns each leaf table, for dumps
    leaf_owner: Vec<(usize, usize)>,
}

impl PageTable {
    /// Create a page table with only the top level in place
    pub fn new() -> Self {
        PageTable {
            directories: vec![Directory::new()],
            leaves: Vec::new(),
            leaf_owner: Vec::new(),
        }
    }

    /// Find the leaf entry for `va`, creating missing mid and leaf tables
    pub fn walk(&mut self, va: &VirtualAddress) -> PteRef {
        let mid = match self.directories[ROOT].slots[va.top] {
            Some(id) => id as usize,
            None => {
                let id = self.directories.len();
                self.directories.push(Directory::new());
                self.directories[ROOT].slots[va.top] = Some(id as u32);
                log::trace!("created mid table {} for top index {}", id, va.top);
                id
            }
        };

        let leaf = match self.directories[mid].slots[va.mid] {
            Some(id) => id,
            None => {
                let id = self.leaves.len() as u32;
                self.leaves.push(LeafTable::new());
                self.leaf_owner.push((va.top, va.mid));
                self.directories[mid].slots[va.mid] = Some(id);
                log::trace!("created leaf table {} for {}/{}", id, va.top, va.mid);
                id
            }
        };

        PteRef { leaf, index: va.bottom as u16 }
    }

    /// Find the leaf entry for `va` without creating anything
    pub fn lookup(&self, va: &VirtualAddress) -> Option<PteRef> {
        let mid = self.directories[ROOT].slots[va.top]? as usize;
        let leaf = self.directories[mid].slots[va.mid]?;
        Some(PteRef { leaf, index: va.bottom as u16 })
    }

    #[inline]
    pub fn entry(&self, r: PteRef) -> &PageTableEntry {
        &self.leaves[r.leaf()].entries[r.index()]
    }

    #[inline]
    pub fn entry_mut(&mut self, r: PteRef) -> &mut PageTableEntry {
        &mut self.leaves[r.leaf()].entries[r.index()]
    }

    /// Virtual page number mapped by `r`
    pub fn vpn_of(&self, r: PteRef) -> u64 {
        let (top, mid) = self.leaf_owner[r.leaf()];
        ((top as u64) << (2 * TABLE_BITS)) | ((mid as u64) << TABLE_BITS) | r.index() as u64
    }

    /// Number of mid-level tables created so far
    pub fn mid_tables(&self) -> usize {
        self.directories.len() - 1
    }

    pub fn leaf_tables(&self) -> usize {
        self.leaves.len()
    }

    /// Every leaf entry that has ever been mapped, in arena order
    pub fn mapped_entries(&self) -> impl Iterator<Item = (PteRef, &PageTableEntry)> + '_ {
        self.leaves.iter().enumerate().flat_map(|(leaf, table)| {
            table
                .entries
                .iter()
                .enumerate()
                .filter(|(_, pte)| pte.residency() != Residency::Unmapped)
                .map(move |(index, pte)| (PteRef { leaf: leaf as u32, index: index as u16 }, pte))
        })
    }

    pub fn footprint_bytes(&self) -> usize {
        self.directories.len() * TABLE_LEN * std::mem::size_of::<Option<u32>>()
            + self.leaves.len() * TABLE_LEN * std::mem::size_of::<PageTableEntry>()
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "page table: {} mid tables, {} leaf tables", self.mid_tables(), self.leaf_tables())?;
        for (r, pte) in self.mapped_entries() {
            write!(f, "  vpn {:#011x} ", self.vpn_of(r))?;
            match pte.residency() {
                Residency::Resident { frame, .. } => writeln!(
                    f,
                    "-> frame {}{}{}",
                    frame,
                    if pte.is_dirty() { " D" } else { "" },
                    if pte.is_referenced() { " R" } else { "" }
                )?,
                Residency::OnSwap { offset } => writeln!(f, "-> swap {}", offset)?,
                Residency::Unmapped => {}
            }
        }
        Ok(())
    }
}
