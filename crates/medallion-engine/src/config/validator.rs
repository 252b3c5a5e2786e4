//! Semantic validation for parsed pipeline configuration values.

use anyhow::{bail, Result};
use medallion_store::schema::{validate_identifier, AUDIT_SCHEMA, BRONZE_SCHEMA, SILVER_SCHEMA};

use crate::config::types::{DatabaseConfig, PipelineConfig};

fn validate_database(db: &DatabaseConfig, context: &str, errors: &mut Vec<String>) {
    if db.host.trim().is_empty() {
        errors.push(format!("{context}: host must not be empty"));
    }
    if db.port == 0 {
        errors.push(format!("{context}: port must be > 0"));
    }
    if db.user.trim().is_empty() {
        errors.push(format!("{context}: user must not be empty"));
    }
    if db.database.trim().is_empty() {
        errors.push(format!("{context}: database must not be empty"));
    }
}

fn validate_schema_name(schema: &str, context: &str, errors: &mut Vec<String>) {
    if let Err(e) = validate_identifier(schema) {
        errors.push(format!("{context}: {e}"));
    }
}

/// Validate a parsed pipeline configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the pipeline config.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported pipeline version '{}', expected '1.0'",
            config.version
        ));
    }

    if config.pipeline.trim().is_empty() {
        errors.push("Pipeline name must not be empty".to_string());
    }

    if config.bronze.input_dir.as_os_str().is_empty() {
        errors.push("bronze.input_dir must not be empty".to_string());
    }

    validate_database(&config.warehouse, "warehouse", &mut errors);

    validate_schema_name(&config.gold.schema, "gold.schema", &mut errors);
    if [BRONZE_SCHEMA, SILVER_SCHEMA, AUDIT_SCHEMA].contains(&config.gold.schema.as_str()) {
        errors.push(format!(
            "gold.schema '{}' collides with a pipeline-managed schema",
            config.gold.schema
        ));
    }

    if let Some(replica) = &config.replica {
        validate_database(&replica.connection, "replica", &mut errors);
        validate_schema_name(&replica.schema, "replica.schema", &mut errors);
    }

    if !errors.is_empty() {
        bail!("Pipeline validation failed:\n  - {}", errors.join("\n  - "));
    }

    Ok(())
}
