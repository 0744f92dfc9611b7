use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::Snapshot;
use crate::planner::ChunkRange;

/// Why a single line could not be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no ';' delimiter")]
    MissingDelimiter,
    #[error("empty key")]
    EmptyKey,
    #[error("key is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Failure that stops one worker. Sibling workers keep running.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed record at byte {offset}: {source}")]
    Parse {
        offset: u64,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug)]
pub struct WorkerFailure {
    pub range: ChunkRange,
    pub error: WorkerError,
}

/// Run-level errors surfaced by the coordinator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    /// At least one worker failed. `partial` holds whatever the other workers
    /// contributed and must not be reported as a complete result.
    #[error("{} of {workers} workers failed, aggregate is incomplete", .failures.len())]
    Incomplete {
        workers: usize,
        failures: Vec<WorkerFailure>,
        partial: Snapshot,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
