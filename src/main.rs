//! vmsim - Virtual memory simulator entry point
//!
//! Usage: vmsim -f <tracefile> -m <memsize> -s <swapsize> -a <algorithm>
//!
//! Replays a memory reference trace through a three-level page table backed
//! by `memsize` physical frames and a `swapsize`-page swap store, evicting
//! with one of `rand`, `rr`, `clock` or `lru`, then prints hit/miss and
//! eviction statistics.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use vmsim::constants::DEFAULT_SEED;
use vmsim::logger;
use vmsim::{Algorithm, SimConfig, SimError, Simulator, TraceReader};

/// Command-line configuration
#[derive(Parser, Debug)]
#[command(name = "vmsim")]
#[command(about = "Simulate paging of a memory reference trace")]
#[command(version)]
struct Cli {
    /// Trace file to replay
    #[arg(short = 'f', long = "file")]
    tracefile: PathBuf,

    /// Number of physical frames
    #[arg(short, long)]
    memsize: usize,

    /// Swap capacity in pages
    #[arg(short, long)]
    swapsize: usize,

    /// Replacement algorithm: rand, rr, clock or lru
    #[arg(short, long)]
    algorithm: String,

    /// Seed for the rand algorithm
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Log every access and dump the page table at the end
    #[arg(short, long)]
    debug: bool,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    logger::init(logger::level_for(cli.verbose, cli.debug));

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main logic separated from main() for cleaner error handling
fn run(cli: &Cli) -> Result<(), SimError> {
    // The algorithm is resolved before the trace is touched
    let algorithm: Algorithm = cli.algorithm.parse()?;
    let config = SimConfig::new(cli.memsize, cli.swapsize, algorithm).with_seed(cli.seed);
    config.validate()?;

    let trace = TraceReader::open(&cli.tracefile).map_err(|e| {
        SimError::Io(std::io::Error::new(e.kind(), format!("{}: {}", cli.tracefile.display(), e)))
    })?;

    let mut sim = Simulator::new(&config)?;
    let report = sim.run(trace)?;

    if cli.debug {
        log::debug!("{}", sim.page_table());
    }
    sim.finish();

    println!();
    println!("{}", report);
    Ok(())
}
