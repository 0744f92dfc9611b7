use std::path::PathBuf;

use clap::ValueEnum;

/// Bytes fetched per refill before any window growth.
pub const DEFAULT_WINDOW_SIZE: usize = 8192;
/// Below this many bytes per worker the whole file goes to one worker.
pub const DEFAULT_MIN_CHUNK_SIZE: usize = DEFAULT_WINDOW_SIZE;
pub const DEFAULT_PATH: &str = "./measurements.txt";

/// How workers publish their results into the shared table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MergeStrategy {
    /// Every record is merged straight into the shared table.
    #[default]
    Shared,
    /// Workers fill a private table and fold it in once at the end.
    Local,
}

/// What a worker does with a line it cannot parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ParsePolicy {
    /// Drop the line, count it, keep going.
    #[default]
    Skip,
    /// Stop the worker; the run reports an incomplete aggregate.
    Abort,
}

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub path: PathBuf,
    pub workers: usize,
    pub min_chunk_size: usize,
    pub window_size: usize,
    pub strategy: MergeStrategy,
    pub parse_policy: ParsePolicy,
}

impl ScanConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn min_chunk_size(mut self, bytes: usize) -> Self {
        self.min_chunk_size = bytes;
        self
    }

    pub fn window_size(mut self, bytes: usize) -> Self {
        self.window_size = bytes;
        self
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            workers: rayon::current_num_threads(),
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            strategy: MergeStrategy::default(),
            parse_policy: ParsePolicy::default(),
        }
    }
}
