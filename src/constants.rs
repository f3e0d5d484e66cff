pub const PAGE_SHIFT: u32 = 12;
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

// Each level of the page table is indexed by 12 bits of the virtual address.
pub const TABLE_BITS: u32 = 12;
pub const TABLE_LEN: usize = 1 << TABLE_BITS;
pub const INDEX_MASK: u64 = (1 << TABLE_BITS) - 1;

pub const TOP_SHIFT: u32 = PAGE_SHIFT + 2 * TABLE_BITS;
pub const MID_SHIFT: u32 = PAGE_SHIFT + TABLE_BITS;
pub const BOT_SHIFT: u32 = PAGE_SHIFT;

pub const OFFSET_MASK: u64 = (1 << PAGE_SHIFT) - 1;

/// Bytes actually backing one simulated frame. Trace offsets must stay below this.
pub const SIM_PAGE_SIZE: usize = 16;

/// Seed for the random policy when none is given, so runs are repeatable.
pub const DEFAULT_SEED: u64 = 369;
