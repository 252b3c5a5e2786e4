//! Single-stage commands.

use std::path::Path;

use anyhow::Result;
use medallion_engine::orchestrator;

/// Execute the `bronze` command.
pub async fn bronze(pipeline_path: &Path) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    let report = orchestrator::run_bronze(&config).await?;

    println!("Bronze load completed in {:.2}s.", report.duration_secs);
    super::run::print_bronze(&report);
    Ok(())
}

/// Execute the `silver` command.
pub async fn silver(pipeline_path: &Path, dry_run: bool) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    let report = orchestrator::run_silver(&config, dry_run).await?;

    if dry_run {
        println!("Silver dry run: nothing was written.");
    } else {
        println!(
            "Silver layer published: {} rows, {} audit records, {:.2}s.",
            report.rows_written, report.audit_records_written, report.duration_secs
        );
    }
    super::run::print_silver(&report);
    Ok(())
}

/// Execute the `gold` command.
pub async fn gold(pipeline_path: &Path) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    let report = orchestrator::run_gold(&config).await?;

    println!("Gold build completed in {:.2}s.", report.duration_secs);
    super::run::print_gold(&report);
    for table in &report.tables {
        println!("    {:38} {}", table.name, table.rows);
    }
    Ok(())
}
