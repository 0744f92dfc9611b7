use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Instant;

use memmap2::Mmap;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregationMap, LocalTable, Snapshot};
use crate::config::{MergeStrategy, ParsePolicy, ScanConfig};
use crate::decimal::Decimal;
use crate::error::{Error, Result, WorkerError, WorkerFailure};
use crate::parse::parse_line;
use crate::planner::{plan, ChunkRange};
use crate::reader::ChunkReader;

/// Heuristic capacity: distinct keys are usually few compared to lines.
const LOCAL_CAPACITY: usize = 1 << 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerSummary {
    pub range: ChunkRange,
    /// Records merged.
    pub lines: u64,
    /// Malformed lines dropped under [`ParsePolicy::Skip`].
    pub skipped: u64,
}

/// A complete run: every worker finished without error.
#[derive(Debug)]
pub struct Outcome {
    pub snapshot: Snapshot,
    pub workers: usize,
    pub lines: u64,
    pub skipped: u64,
}

/// Plan `config.path` into line-aligned ranges and scan them in parallel.
pub fn run(config: &ScanConfig) -> Result<Outcome> {
    let open_err = |source: io::Error| Error::Open {
        path: config.path.clone(),
        source,
    };
    let file = File::open(&config.path).map_err(open_err)?;
    let len = file.metadata().map_err(open_err)?.len();

    let ranges = if len == 0 {
        plan(&[], config.workers, config.min_chunk_size)
    } else {
        // SAFETY: the map is read-only and dropped before any worker starts.
        // The input must not be truncated while it is mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(open_err)?;
        plan(&mmap, config.workers, config.min_chunk_size)
    };
    debug!(
        path = %config.path.display(),
        len,
        workers = ranges.len(),
        "planned chunks"
    );

    scan_ranges(&config.path, &ranges, config)
}

/// Run one worker per range and wait for all of them.
///
/// A failing worker does not stop the others. Once every worker has
/// returned, failures are reported together through [`Error::Incomplete`],
/// which also carries what the successful workers produced.
pub fn scan_ranges(path: &Path, ranges: &[ChunkRange], config: &ScanConfig) -> Result<Outcome> {
    let started = Instant::now();
    let pool = ThreadPoolBuilder::new()
        .num_threads(ranges.len().max(1))
        .thread_name(|i| format!("scan-worker-{i}"))
        .build()?;

    let table = AggregationMap::new();
    let results: Vec<std::result::Result<WorkerSummary, WorkerFailure>> = pool.install(|| {
        ranges
            .par_iter()
            .with_max_len(1)
            .map(|&range| scan_worker(path, range, config, &table))
            .collect()
    });

    let mut failures = Vec::new();
    let (mut lines, mut skipped) = (0u64, 0u64);
    for result in results {
        match result {
            Ok(summary) => {
                lines += summary.lines;
                skipped += summary.skipped;
            }
            Err(failure) => {
                warn!(range = %failure.range, error = %failure.error, "worker failed");
                failures.push(failure);
            }
        }
    }

    let snapshot = table.into_snapshot();
    if !failures.is_empty() {
        return Err(Error::Incomplete {
            workers: ranges.len(),
            failures,
            partial: snapshot,
        });
    }
    if skipped > 0 {
        warn!(skipped, "skipped malformed lines");
    }
    info!(
        keys = snapshot.len(),
        lines,
        workers = ranges.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan complete"
    );

    Ok(Outcome {
        snapshot,
        workers: ranges.len(),
        lines,
        skipped,
    })
}

fn scan_worker(
    path: &Path,
    range: ChunkRange,
    config: &ScanConfig,
    table: &AggregationMap,
) -> std::result::Result<WorkerSummary, WorkerFailure> {
    let result = match config.strategy {
        MergeStrategy::Shared => {
            scan_chunk(path, range, config, |key, value| table.merge(key, value))
        }
        MergeStrategy::Local => {
            let mut local = LocalTable::with_capacity(LOCAL_CAPACITY);
            let result = scan_chunk(path, range, config, |key, value| local.merge(key, value));
            table.absorb(local);
            result
        }
    };

    match result {
        Ok(summary) => {
            debug!(
                %range,
                bytes = range.len(),
                lines = summary.lines,
                skipped = summary.skipped,
                "worker done"
            );
            Ok(summary)
        }
        Err(error) => Err(WorkerFailure { range, error }),
    }
}

/// Read every line of `range`, parse it and hand the record to `merge`.
pub fn scan_chunk<F>(
    path: &Path,
    range: ChunkRange,
    config: &ScanConfig,
    mut merge: F,
) -> std::result::Result<WorkerSummary, WorkerError>
where
    F: FnMut(&str, Decimal),
{
    let mut reader = ChunkReader::open(path, range, config.window_size)?;
    let mut summary = WorkerSummary {
        range,
        lines: 0,
        skipped: 0,
    };

    loop {
        let parsed = match reader.read_line()? {
            None => break,
            // blank lines are noise when skipping, malformed when strict
            Some([]) if config.parse_policy == ParsePolicy::Skip => continue,
            Some(line) => parse_line(line).map(|record| merge(record.key, record.value)),
        };
        let source = match parsed {
            Ok(()) => {
                summary.lines += 1;
                continue;
            }
            Err(source) => source,
        };

        let offset = reader.line_offset();
        match config.parse_policy {
            ParsePolicy::Skip => {
                debug!(offset, error = %source, "skipping malformed line");
                summary.skipped += 1;
            }
            ParsePolicy::Abort => return Err(WorkerError::Parse { offset, source }),
        }
    }

    Ok(summary)
}
