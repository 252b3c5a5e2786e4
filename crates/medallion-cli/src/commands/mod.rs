pub mod catalog;
pub mod check;
pub mod run;
pub mod stages;

use std::path::Path;

use anyhow::{Context, Result};
use medallion_engine::config::types::PipelineConfig;
use medallion_engine::config::{parser, validator};

/// Parse and validate a pipeline file.
fn load_config(pipeline_path: &Path) -> Result<PipelineConfig> {
    let config = parser::parse_pipeline(pipeline_path)
        .with_context(|| format!("Failed to parse pipeline: {}", pipeline_path.display()))?;
    validator::validate_pipeline(&config)?;
    Ok(config)
}
