//! Parallel per-key min/mean/max over large `key;value` files.
//!
//! The input is split into line-aligned byte ranges ([`planner`]), each range
//! is scanned by its own worker through a [`reader::ChunkReader`], and records
//! are folded into a shared [`aggregate::AggregationMap`]. Once every worker
//! has joined, the map is frozen into a sorted [`aggregate::Snapshot`] and
//! rendered by [`report`].

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod decimal;
pub mod error;
pub mod parse;
pub mod planner;
pub mod reader;
pub mod report;
pub mod stat;

pub use aggregate::{AggregationMap, LocalTable, Snapshot};
pub use config::{MergeStrategy, ParsePolicy, ScanConfig};
pub use coordinator::{run, scan_ranges, Outcome, WorkerSummary};
pub use decimal::{Decimal, Tenths};
pub use error::{Error, ParseError, Result, WorkerError, WorkerFailure};
pub use planner::{plan, ChunkRange};
pub use reader::ChunkReader;
pub use report::{render, ReportStyle};
pub use stat::StatRecord;
