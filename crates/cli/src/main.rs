//! Cache hierarchy simulator CLI.
//!
//! Builds a hierarchy from a description file, replays a memory-access trace
//! through it, and prints per-level counters:
//! 1. **Config:** `.json` files are read as JSON, anything else as `cachedef` text.
//! 2. **Trace:** Read from a file or stdin; `--follow-markers` restricts replay to `START`/`STOP` windows.
//! 3. **Report:** Text blocks per level (default) or JSON (`--json`) on stdout. Logs go to stderr.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::{CacheHierarchy, HierarchyConfig, TraceReplayer};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven multi-level cache simulator",
    long_about = "Replay a memory-access trace through a set-associative cache hierarchy and report LOAD/STORE/HIT/MISS/EVICT counts per level.\n\nTrace lines: `R <addr> <size>`, `W <addr> <size>`, `START`, `STOP`, `# comment`.\n\nExamples:\n  cachesim -c cachedef -t app.trace\n  cachesim -c hierarchy.json --follow-markers --flush < app.trace"
)]
struct Cli {
    /// Hierarchy description (`.json`, or cachedef text).
    #[arg(short, long)]
    config: PathBuf,

    /// Access trace; `-` or omitted reads stdin.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Only replay accesses between START and STOP markers.
    #[arg(long)]
    follow_markers: bool,

    /// Write back and invalidate every level after the trace, before reporting.
    #[arg(long)]
    flush: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Log hierarchy construction and replay progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads the hierarchy, replays the trace, and prints the report.
fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = HierarchyConfig::load(&cli.config)?;
    let mut caches = CacheHierarchy::build(&config)?;
    info!(levels = caches.depth(), config = %cli.config.display(), "hierarchy ready");

    let mut replayer = TraceReplayer::new(cli.follow_markers);
    let summary = match cli.trace.as_deref() {
        None => replayer.replay(io::stdin().lock(), &mut caches)?,
        Some(path) if path == Path::new("-") => replayer.replay(io::stdin().lock(), &mut caches)?,
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open trace `{}`: {e}", path.display()))?;
            replayer.replay(BufReader::new(file), &mut caches)?
        }
    };
    info!(
        events = summary.events,
        forwarded = summary.forwarded,
        skipped = summary.skipped,
        "replay finished"
    );

    if cli.flush {
        caches.flush();
    }

    let report = caches.release();
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }
    Ok(())
}
