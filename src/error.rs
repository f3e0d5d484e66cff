//! Error types for the simulator and the trace reader.

use thiserror::Error;

use crate::coremap::FrameIndex;
use crate::swap::SwapOffset;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

/// A trace line that cannot be replayed. Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid trace line {line}: {text}")]
    Malformed { line: usize, text: String },

    #[error("Invalid reftype, line {line}: {text}")]
    InvalidAccessType { line: usize, text: String },

    #[error("Invalid vaddr, offset must be in range of simulated page frame size, line {line}: {text}")]
    InvalidOffset { line: usize, text: String },

    #[error("Failed to read trace at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

impl TraceError {
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. }
            | Self::InvalidAccessType { line, .. }
            | Self::InvalidOffset { line, .. }
            | Self::Io { line, .. } => *line,
        }
    }
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid replacement algorithm - {0}")]
    UnknownAlgorithm(String),

    /// Pageout found no free slot. The victim stays resident and the
    /// faulting access is abandoned.
    #[error("Swap exhausted while evicting frame {frame} (capacity {capacity} pages)")]
    SwapExhausted { frame: FrameIndex, capacity: usize },

    #[error("Invalid vaddr {vaddr:#x}, offset must be in range of simulated page frame size")]
    InvalidOffset { vaddr: u64 },

    #[error("Replacement policy had no frame to evict")]
    NoVictim,

    #[error("Replacement policy chose frame {0}, which holds no page")]
    VictimNotResident(FrameIndex),

    #[error("Swap offset {0} was never returned by pageout")]
    UnknownSwapOffset(SwapOffset),
}
