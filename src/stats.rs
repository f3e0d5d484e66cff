use std::fmt;
use std::time::Duration;

/// Event counters for one run. They only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub references: u64,
    pub evict_clean: u64,
    pub evict_dirty: u64,
    /// Loads and fetches that read a byte other than the trace expected
    pub mismatches: u64,
}

impl Stats {
    /// Percentage of references that hit. Zero when nothing was referenced.
    pub fn hit_rate(&self) -> f64 {
        Self::percent(self.hits, self.references)
    }

    pub fn miss_rate(&self) -> f64 {
        Self::percent(self.misses, self.references)
    }

    pub fn evictions(&self) -> u64 {
        self.evict_clean + self.evict_dirty
    }

    fn percent(part: u64, whole: u64) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hit count: {}", self.hits)?;
        writeln!(f, "Miss count: {}", self.misses)?;
        writeln!(f, "Clean evictions: {}", self.evict_clean)?;
        writeln!(f, "Dirty evictions: {}", self.evict_dirty)?;
        writeln!(f, "Total references: {}", self.references)?;
        writeln!(f, "Hit rate: {:.4}", self.hit_rate())?;
        write!(f, "Miss rate: {:.4}", self.miss_rate())
    }
}

/// Everything printed at the end of a run
#[derive(Debug, Clone)]
pub struct Report {
    pub stats: Stats,
    pub elapsed: Duration,
    pub footprint_bytes: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.stats)?;
        writeln!(f, "Value mismatches: {}", self.stats.mismatches)?;
        writeln!(f, "Time to run simulation: {:.6}", self.elapsed.as_secs_f64())?;
        write!(f, "Memory used by simulation: {} bytes", self.footprint_bytes)
    }
}
