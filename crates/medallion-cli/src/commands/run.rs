use std::path::Path;

use anyhow::Result;
use medallion_engine::orchestrator::{self, RunOptions};
use medallion_engine::{BronzeReport, GoldReport, PipelineResult, SilverReport};

/// Execute the `run` command: parse, validate, and run every stage.
pub async fn execute(
    pipeline_path: &Path,
    skip_bronze: bool,
    skip_gold: bool,
    json: bool,
) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    tracing::info!(
        pipeline = config.pipeline,
        input_dir = %config.bronze.input_dir.display(),
        replica = config.replica.is_some(),
        "Pipeline validated"
    );

    let options = RunOptions {
        skip_bronze,
        skip_gold,
    };
    let result = orchestrator::run_pipeline(&config, options).await?;

    if json {
        println!("{}", summary_json(&result));
        return Ok(());
    }

    println!("Pipeline '{}' completed successfully.", config.pipeline);
    if let Some(bronze) = &result.bronze {
        print_bronze(bronze);
    }
    print_silver(&result.silver);
    if let Some(gold) = &result.gold {
        print_gold(gold);
    }
    println!("  Duration:        {:.2}s", result.duration_secs);
    Ok(())
}

pub(super) fn print_bronze(report: &BronzeReport) {
    println!("  Bronze rows loaded: {}", report.rows_loaded());
    for table in &report.tables {
        match table.rows_loaded {
            Some(rows) => println!("    {:12} {rows}", table.table.as_str()),
            None => println!("    {:12} skipped (no input file)", table.table.as_str()),
        }
    }
}

pub(super) fn print_silver(report: &SilverReport) {
    println!(
        "  Silver accepted: {}  rejected: {}  audit records: {}",
        report.total_accepted(),
        report.total_rejected(),
        report.audit_records
    );
    println!(
        "    {:12} {:>7} {:>9} {:>9} {:>8} {:>11} {:>11}",
        "table", "input", "accepted", "rejected", "flagged", "duplicates", "null dates"
    );
    for t in &report.tables {
        println!(
            "    {:12} {:>7} {:>9} {:>9} {:>8} {:>11} {:>11}",
            t.table.as_str(),
            t.input_rows,
            t.accepted,
            t.rejected,
            t.flagged,
            t.duplicates_removed,
            t.null_dates
        );
    }
}

pub(super) fn print_gold(report: &GoldReport) {
    match &report.replica_schema {
        Some(replica) => println!(
            "  Gold tables built: {} (schema {}, replica schema {replica})",
            report.tables.len(),
            report.schema
        ),
        None => println!(
            "  Gold tables built: {} (schema {})",
            report.tables.len(),
            report.schema
        ),
    }
}

fn summary_json(result: &PipelineResult) -> serde_json::Value {
    let tables: Vec<_> = result
        .silver
        .tables
        .iter()
        .map(|t| {
            serde_json::json!({
                "table": t.table.as_str(),
                "input_rows": t.input_rows,
                "accepted": t.accepted,
                "rejected": t.rejected,
                "flagged": t.flagged,
                "duplicates_removed": t.duplicates_removed,
                "null_dates": t.null_dates,
            })
        })
        .collect();

    serde_json::json!({
        "bronze_rows_loaded": result.bronze.as_ref().map(BronzeReport::rows_loaded),
        "silver": tables,
        "audit_records_written": result.silver.audit_records_written,
        "gold_tables": result.gold.as_ref().map(|g| g.tables.len()),
        "duration_secs": result.duration_secs,
    })
}
