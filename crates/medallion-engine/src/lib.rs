//! Bronze ingestion, silver validation/cleaning, and gold aggregation
//! stages of the medallion pipeline, plus the orchestrator that sequences
//! them.

#![warn(clippy::pedantic)]

pub mod bronze;
pub mod config;
pub mod errors;
pub mod gold;
pub mod orchestrator;
pub mod result;
pub mod silver;

// Re-export public API for convenience
pub use errors::{PipelineError, Stage};
pub use orchestrator::{check_pipeline, execute_pipeline, run_pipeline, RunOptions};
pub use result::{
    BronzeReport, BronzeTableReport, CheckResult, GoldReport, GoldTableReport, PipelineResult,
    SilverReport, TableReport,
};
