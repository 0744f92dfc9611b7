use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chunked_stats::config::{DEFAULT_MIN_CHUNK_SIZE, DEFAULT_PATH, DEFAULT_WINDOW_SIZE};
use chunked_stats::{render, Error, MergeStrategy, ParsePolicy, ReportStyle, ScanConfig};

#[derive(Debug, Parser)]
#[command(version, about = "Per-key min/mean/max over a `key;value` file")]
struct Args {
    /// Input file, one `key;value` record per line.
    #[arg(default_value = DEFAULT_PATH)]
    path: PathBuf,

    /// Worker count (defaults to available parallelism).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Below this many bytes per worker the file is scanned by one worker.
    #[arg(long, default_value_t = DEFAULT_MIN_CHUNK_SIZE)]
    min_chunk: usize,

    /// Initial read window per refill, in bytes.
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    #[arg(long, value_enum, default_value_t = MergeStrategy::Shared)]
    strategy: MergeStrategy,

    /// Fail the run on the first malformed line instead of skipping it.
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value_t = ReportStyle::Lines)]
    format: ReportStyle,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = ScanConfig::new(args.path)
        .min_chunk_size(args.min_chunk)
        .window_size(args.window)
        .strategy(args.strategy)
        .parse_policy(if args.strict {
            ParsePolicy::Abort
        } else {
            ParsePolicy::Skip
        });
    if let Some(workers) = args.workers {
        config = config.workers(workers);
    }

    let outcome = match chunked_stats::run(&config) {
        Ok(outcome) => outcome,
        Err(Error::Incomplete {
            workers, failures, ..
        }) => {
            for failure in &failures {
                eprintln!("chunk {}: {}", failure.range, failure.error);
            }
            anyhow::bail!(
                "{} of {workers} workers failed; no report written for {}",
                failures.len(),
                config.path.display()
            );
        }
        Err(err) => return Err(err).context("scan failed"),
    };

    let mut out = BufWriter::new(io::stdout().lock());
    out.write_all(render(&outcome.snapshot, args.format).as_bytes())?;
    out.flush()?;
    Ok(())
}
