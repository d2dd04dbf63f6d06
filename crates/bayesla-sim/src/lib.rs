//! Batch execution of link-adaptation experiments.
//!
//! - [`runner`] fans seeds out over a scoped worker pool and gathers the
//!   per-experiment logs back in submission order
//! - [`archive`] turns a finished batch into the JSON results document

pub mod archive;
pub mod runner;

pub use archive::{PolicyArchive, ResultsArchive};
pub use runner::{BatchOutcome, Runner, default_workers, log_summary, summarize};
