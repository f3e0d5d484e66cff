//! The simulator context: one page table, one coremap, one policy, one
//! swap store, replaying a single process's trace.

use std::time::Instant;

use log::{debug, error, info, trace};

use crate::constants::DEFAULT_SEED;
use crate::coremap::{Coremap, FrameIndex, Residents};
use crate::error::{Result, SimError, TraceError};
use crate::memory::PhysicalMemory;
use crate::pagetable::{PageTable, PteRef};
use crate::policy::{Algorithm, Policy, ReplacementPolicy};
use crate::pte::Residency;
use crate::stats::{Report, Stats};
use crate::swap::{MemorySwap, SwapStore};
use crate::trace::TraceRecord;
use crate::translation::{AccessType, VirtualAddress};

/// Run parameters
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of physical frames
    pub memsize: usize,
    /// Swap capacity in pages
    pub swapsize: usize,
    pub algorithm: Algorithm,
    pub seed: u64,
}

impl SimConfig {
    pub fn new(memsize: usize, swapsize: usize, algorithm: Algorithm) -> Self {
        SimConfig { memsize, swapsize, algorithm, seed: DEFAULT_SEED }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.memsize == 0 {
            return Err(SimError::InvalidConfig("memsize must be greater than 0".to_string()));
        }
        if self.swapsize == 0 {
            return Err(SimError::InvalidConfig("swapsize must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// A load or fetch that saw a different byte than the trace recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub line: usize,
    pub found: u8,
    pub expected: u8,
}

pub struct Simulator<S: SwapStore = MemorySwap> {
    page_table: PageTable,
    coremap: Coremap,
    memory: PhysicalMemory,
    swap: S,
    policy: Policy,
    stats: Stats,
}

impl Simulator<MemorySwap> {
    /// Build a simulator with an in-memory swap store of `config.swapsize` pages
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;
        let policy = Policy::new(config.algorithm, config.seed);
        Ok(Self::with_swap(config.memsize, policy, MemorySwap::new(config.swapsize)))
    }
}

impl<S: SwapStore> Simulator<S> {
    /// Build a simulator over a caller-supplied swap store
    pub fn with_swap(memsize: usize, mut policy: Policy, swap: S) -> Self {
        policy.init(memsize);
        info!(
            "simulating {} frames, {} swap pages, {} replacement",
            memsize,
            swap.capacity(),
            policy.name()
        );
        Simulator {
            page_table: PageTable::new(),
            coremap: Coremap::new(memsize),
            memory: PhysicalMemory::new(memsize),
            swap,
            policy,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn coremap(&self) -> &Coremap {
        &self.coremap
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    pub fn swap(&self) -> &S {
        &self.swap
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Frame currently holding the page of `va`, if resident
    pub fn frame_of(&self, va: &VirtualAddress) -> Option<FrameIndex> {
        self.page_table.lookup(va).and_then(|r| self.page_table.entry(r).frame())
    }

    /// Translate `va` to an address in simulated physical memory, faulting
    /// the page in if needed.
    pub fn translate(&mut self, va: &VirtualAddress, access: AccessType) -> Result<usize> {
        if !va.offset_in_frame() {
            return Err(SimError::InvalidOffset { vaddr: va.raw });
        }
        let pte = self.page_table.walk(va);
        self.stats.references += 1;

        let frame = match self.page_table.entry(pte).frame() {
            Some(frame) => {
                self.stats.hits += 1;
                frame
            }
            None => {
                // A fault counts even when the frame cannot be found
                self.stats.misses += 1;
                self.fault_in(pte)?
            }
        };

        let entry = self.page_table.entry_mut(pte);
        entry.set_referenced(true);
        if access.is_write() {
            entry.set_dirty(true);
        }

        self.policy.reference(frame);
        Ok(PhysicalMemory::frame_to_address(frame) + va.offset)
    }

    /// Bring the page behind `pte` into a frame: from swap if it was evicted,
    /// zero-filled if this is its first touch.
    fn fault_in(&mut self, pte: PteRef) -> Result<FrameIndex> {
        let frame = self.allocate_frame(pte)?;

        match self.page_table.entry(pte).residency() {
            Residency::OnSwap { offset } => {
                if let Err(e) = self.swap.pagein(self.memory.frame_mut(frame), offset) {
                    self.coremap.release(frame);
                    return Err(e);
                }
                let entry = self.page_table.entry_mut(pte);
                entry.make_resident(frame);
                entry.set_dirty(false);
                debug!("vpn {:#x}: swapped in from {} to frame {}", self.page_table.vpn_of(pte), offset, frame);
            }
            Residency::Unmapped => {
                self.memory.zero_frame(frame);
                let entry = self.page_table.entry_mut(pte);
                entry.make_resident(frame);
                // First touch counts as a write, whatever the access type
                entry.set_dirty(true);
                debug!("vpn {:#x}: first touch in frame {}", self.page_table.vpn_of(pte), frame);
            }
            Residency::Resident { .. } => unreachable!("fault on a resident page"),
        }

        Ok(frame)
    }

    /// Find a frame for `pte`, evicting a victim when memory is full.
    pub fn allocate_frame(&mut self, pte: PteRef) -> Result<FrameIndex> {
        let frame = match self.coremap.find_free() {
            Some(frame) => frame,
            None => self.evict()?,
        };
        self.coremap.claim(frame, pte);
        Ok(frame)
    }

    /// Ask the policy for a victim, page it out, and free its frame. On a
    /// full swap store nothing is changed and the error is returned.
    fn evict(&mut self) -> Result<FrameIndex> {
        let frame = self
            .policy
            .evict(&mut Residents::new(&self.coremap, &mut self.page_table))
            .ok_or(SimError::NoVictim)?;
        let victim = self.coremap.occupant(frame).ok_or(SimError::VictimNotResident(frame))?;

        let entry = self.page_table.entry(victim);
        let dirty = entry.is_dirty();
        // Every victim goes through pageout, clean or dirty.
        let offset = self
            .swap
            .pageout(self.memory.frame(frame), entry.swap_slot())
            .ok_or(SimError::SwapExhausted { frame, capacity: self.swap.capacity() })?;

        if dirty {
            self.stats.evict_dirty += 1;
        } else {
            self.stats.evict_clean += 1;
        }
        self.page_table.entry_mut(victim).move_to_swap(offset);
        self.coremap.release(frame);

        debug!(
            "evicted vpn {:#x} from frame {} to swap {} ({})",
            self.page_table.vpn_of(victim),
            frame,
            offset,
            if dirty { "dirty" } else { "clean" }
        );
        Ok(frame)
    }

    /// Perform one trace access: stores write the byte, loads and fetches
    /// check it.
    pub fn access(&mut self, record: &TraceRecord) -> Result<Option<Mismatch>> {
        trace!("{} {:x} {}", record.access, record.vaddr.raw, record.value);
        let addr = self.translate(&record.vaddr, record.access)?;

        if record.access.is_write() {
            self.memory.write(addr, record.value);
            return Ok(None);
        }

        let found = self.memory.read(addr);
        if found == record.value {
            return Ok(None);
        }
        self.stats.mismatches += 1;
        error!(
            "ERROR at trace line {}: vaddr has {} but should have {}",
            record.line, found, record.value
        );
        Ok(Some(Mismatch { line: record.line, found, expected: record.value }))
    }

    /// Replay records until they run out or one fails
    pub fn replay<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<TraceRecord, TraceError>>,
    {
        for record in records {
            self.access(&record?)?;
        }
        Ok(())
    }

    /// Replay and time a whole trace, producing the run-end report
    pub fn run<I>(&mut self, records: I) -> Result<Report>
    where
        I: IntoIterator<Item = std::result::Result<TraceRecord, TraceError>>,
    {
        let start = Instant::now();
        self.replay(records)?;
        let elapsed = start.elapsed();
        info!("replayed {} references in {:?}", self.stats.references, elapsed);
        Ok(Report { stats: self.stats, elapsed, footprint_bytes: self.footprint_bytes() })
    }

    /// Release policy state at the end of the run
    pub fn finish(&mut self) {
        self.policy.cleanup();
    }

    /// Bytes held by the simulated structures
    pub fn footprint_bytes(&self) -> usize {
        self.memory.footprint_bytes()
            + self.coremap.footprint_bytes()
            + self.page_table.footprint_bytes()
            + self.swap.footprint_bytes()
    }

    /// Check that the coremap and the page table agree: every frame in use
    /// is referenced by exactly the resident entry it points back to, and
    /// no resident entry is missing from the coremap.
    pub fn verify(&self) -> std::result::Result<(), String> {
        let mut owners: Vec<Option<PteRef>> = vec![None; self.coremap.len()];
        for (r, pte) in self.page_table.mapped_entries() {
            let Some(frame) = pte.frame() else { continue };
            let slot = owners
                .get_mut(frame.0)
                .ok_or_else(|| format!("vpn {:#x} maps to frame {} out of range", self.page_table.vpn_of(r), frame))?;
            if let Some(other) = slot {
                return Err(format!(
                    "frame {} mapped by both vpn {:#x} and vpn {:#x}",
                    frame,
                    self.page_table.vpn_of(*other),
                    self.page_table.vpn_of(r)
                ));
            }
            *slot = Some(r);
        }

        for (frame, f) in self.coremap.iter() {
            if f.occupant() != owners[frame.0] {
                return Err(format!(
                    "frame {}: coremap says {:?}, page table says {:?}",
                    frame,
                    f.occupant(),
                    owners[frame.0]
                ));
            }
        }

        let s = &self.stats;
        if s.hits + s.misses != s.references {
            return Err(format!("{} hits + {} misses != {} references", s.hits, s.misses, s.references));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SIM_PAGE_SIZE;
    use crate::swap::SwapOffset;

    fn page(n: u64) -> VirtualAddress {
        VirtualAddress::from_raw(n << 12)
    }

    fn sim(memsize: usize, swapsize: usize, algorithm: Algorithm) -> Simulator {
        Simulator::new(&SimConfig::new(memsize, swapsize, algorithm)).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(SimConfig::new(0, 4, Algorithm::Lru).validate().is_err());
        assert!(SimConfig::new(4, 0, Algorithm::Lru).validate().is_err());
        assert!(SimConfig::new(1, 1, Algorithm::Lru).validate().is_ok());
        assert!(matches!(
            Simulator::new(&SimConfig::new(0, 1, Algorithm::Clock)),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_first_touch_is_miss_and_zeroed() {
        let mut s = sim(2, 4, Algorithm::Lru);
        let addr = s.translate(&VirtualAddress::from_raw(0x5003), AccessType::Load).unwrap();
        assert_eq!(s.stats().misses, 1);
        assert_eq!(s.stats().hits, 0);
        assert_eq!(addr, 3);
        assert_eq!(s.memory().read(addr), 0);
    }

    #[test]
    fn test_first_touch_is_dirty_even_for_loads() {
        let mut s = sim(2, 4, Algorithm::Lru);
        s.translate(&page(1), AccessType::Instruction).unwrap();
        let r = s.page_table().lookup(&page(1)).unwrap();
        let pte = s.page_table().entry(r);
        assert!(pte.is_valid());
        assert!(pte.is_dirty());
        assert!(pte.is_referenced());
    }

    #[test]
    fn test_second_touch_hits_same_frame() {
        let mut s = sim(2, 4, Algorithm::Lru);
        let a = s.translate(&VirtualAddress::from_raw(0x1001), AccessType::Load).unwrap();
        let b = s.translate(&VirtualAddress::from_raw(0x1002), AccessType::Store).unwrap();
        assert_eq!(a + 1, b);
        assert_eq!(s.stats().hits, 1);
        assert_eq!(s.stats().misses, 1);
        assert_eq!(s.stats().references, 2);
    }

    #[test]
    fn test_eviction_moves_victim_to_swap() {
        let mut s = sim(1, 4, Algorithm::RoundRobin);
        s.translate(&page(1), AccessType::Load).unwrap();
        s.translate(&page(2), AccessType::Load).unwrap();

        let r1 = s.page_table().lookup(&page(1)).unwrap();
        let old = s.page_table().entry(r1);
        assert!(!old.is_valid());
        assert!(old.is_on_swap());
        assert!(!old.is_dirty());
        assert_eq!(old.swap_offset(), Some(SwapOffset(0)));

        assert_eq!(s.frame_of(&page(2)), Some(FrameIndex(0)));
        // page 1 was dirty from its first touch
        assert_eq!(s.stats().evict_dirty, 1);
        assert_eq!(s.stats().evict_clean, 0);
        s.verify().unwrap();
    }

    #[test]
    fn test_swapped_in_page_starts_clean() {
        let mut s = sim(1, 4, Algorithm::RoundRobin);
        s.translate(&page(1), AccessType::Load).unwrap();
        s.translate(&page(2), AccessType::Load).unwrap();
        s.translate(&page(1), AccessType::Load).unwrap();

        let r1 = s.page_table().lookup(&page(1)).unwrap();
        assert!(s.page_table().entry(r1).is_valid());
        assert!(!s.page_table().entry(r1).is_dirty());

        // Evicting it again is a clean eviction that reuses its slot
        s.translate(&page(2), AccessType::Load).unwrap();
        assert_eq!(s.stats().evict_clean, 1);
        assert_eq!(s.page_table().entry(r1).swap_offset(), Some(SwapOffset(0)));
        assert_eq!(s.swap().used_slots(), 2);
    }

    #[test]
    fn test_swap_exhaustion_keeps_victim_resident() {
        let mut s = sim(1, 1, Algorithm::RoundRobin);
        s.translate(&page(1), AccessType::Load).unwrap();
        s.translate(&page(2), AccessType::Load).unwrap(); // page 1 takes the only slot
        let err = s.translate(&page(3), AccessType::Load).unwrap_err();
        assert!(matches!(err, SimError::SwapExhausted { frame: FrameIndex(0), capacity: 1 }));

        assert_eq!(s.frame_of(&page(2)), Some(FrameIndex(0)));
        assert_eq!(s.frame_of(&page(3)), None);
        assert_eq!(s.stats().misses, 3);
        assert_eq!(s.stats().references, 3);
        assert_eq!(s.stats().evictions(), 1);
        s.verify().unwrap();
    }

    #[test]
    fn test_offset_past_frame_is_rejected() {
        let mut s = sim(2, 4, Algorithm::Lru);
        s.translate(&page(1), AccessType::Load).unwrap();
        s.translate(&page(2), AccessType::Load).unwrap();

        let err = s.translate(&VirtualAddress::from_raw(0x1000 | SIM_PAGE_SIZE as u64), AccessType::Store).unwrap_err();
        assert!(matches!(err, SimError::InvalidOffset { vaddr: 0x1010 }));
        let err = s.translate(&VirtualAddress::from_raw(0x1fff), AccessType::Load).unwrap_err();
        assert!(matches!(err, SimError::InvalidOffset { vaddr: 0x1fff }));
        assert_eq!(s.stats().references, 2);

        // A rejected store leaves the neighbouring frame alone
        let rec = TraceRecord { line: 3, access: AccessType::Store, vaddr: VirtualAddress::from_raw(0x1010), value: 99 };
        assert!(s.access(&rec).is_err());
        let rec = TraceRecord { line: 4, access: AccessType::Load, vaddr: page(2), value: 0 };
        assert_eq!(s.access(&rec).unwrap(), None);

        // Past the end of memory with a single frame
        let mut s = sim(1, 4, Algorithm::Lru);
        assert!(s.translate(&VirtualAddress::from_raw(0x1fff), AccessType::Load).is_err());
        assert_eq!(s.coremap().in_use_count(), 0);
    }

    #[test]
    fn test_access_checks_loaded_bytes() {
        let mut s = sim(2, 4, Algorithm::Clock);
        let rec = |line, access, raw, value| TraceRecord { line, access, vaddr: VirtualAddress::from_raw(raw), value };

        assert_eq!(s.access(&rec(1, AccessType::Load, 0x1004, 0)).unwrap(), None);
        assert_eq!(s.access(&rec(2, AccessType::Store, 0x1004, 77)).unwrap(), None);
        assert_eq!(s.access(&rec(3, AccessType::Load, 0x1004, 77)).unwrap(), None);
        assert_eq!(
            s.access(&rec(4, AccessType::Load, 0x1004, 1)).unwrap(),
            Some(Mismatch { line: 4, found: 77, expected: 1 })
        );
        assert_eq!(s.stats().mismatches, 1);
    }

    #[test]
    fn test_footprint_grows_with_tables() {
        let mut s = sim(2, 2, Algorithm::Lru);
        let before = s.footprint_bytes();
        s.translate(&page(1), AccessType::Load).unwrap();
        assert!(s.footprint_bytes() > before);
    }

    #[test]
    fn test_finish_cleans_policy() {
        let mut s = sim(2, 2, Algorithm::Lru);
        s.translate(&page(1), AccessType::Load).unwrap();
        s.finish();
        match s.policy() {
            Policy::Lru(lru) => assert!(lru.recency_order().is_empty()),
            other => panic!("unexpected policy {:?}", other),
        }
    }
}
