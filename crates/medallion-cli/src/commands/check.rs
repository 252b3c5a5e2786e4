use std::path::Path;

use anyhow::Result;
use medallion_engine::orchestrator;

/// Execute the `check` command: validate pipeline config and store connectivity.
pub async fn execute(pipeline_path: &Path) -> Result<()> {
    let config = super::load_config(pipeline_path)?;
    println!("Pipeline structure: OK");

    let result = orchestrator::check_pipeline(&config).await;

    print_status("Warehouse", &result.warehouse);
    if let Some(replica) = &result.replica {
        print_status("Replica", replica);
    }
    for (table, present) in &result.input_files {
        let label = format!("Input {}", table.file_name());
        println!(
            "{:22} {}",
            format!("{label}:"),
            if *present { "found" } else { "missing (will be skipped)" }
        );
    }

    if result.is_ok() {
        println!("\nAll checks passed.");
        Ok(())
    } else {
        anyhow::bail!("One or more checks failed")
    }
}

fn print_status(label: &str, status: &Result<(), String>) {
    match status {
        Ok(()) => println!("{:22} OK", format!("{label}:")),
        Err(message) => {
            println!("{:22} FAILED", format!("{label}:"));
            println!("  {message}");
        }
    }
}
