pub mod constants;
pub mod coremap;
pub mod error;
pub mod logger;
pub mod memory;
pub mod pagetable;
pub mod policy;
pub mod pte;
pub mod sim;
pub mod stats;
pub mod swap;
pub mod trace;
pub mod translation;

// Re-export commonly used items for convenience
pub use constants::*;
pub use coremap::FrameIndex;
pub use error::{SimError, TraceError};
pub use policy::{Algorithm, Policy, ReplacementPolicy};
pub use sim::{Mismatch, SimConfig, Simulator};
pub use stats::{Report, Stats};
pub use swap::{MemorySwap, SwapOffset, SwapStore};
pub use trace::{TraceReader, TraceRecord};
pub use translation::{AccessType, VirtualAddress};
