mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "medallion",
    version,
    about = "Bronze/silver/gold batch pipeline with an audited silver layer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run bronze, silver, and gold in order
    Run {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
        /// Reuse the bronze tables already in the warehouse
        #[arg(long)]
        skip_bronze: bool,
        /// Stop after the silver stage
        #[arg(long)]
        skip_gold: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the CSV inputs into bronze
    Bronze {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
    },
    /// Validate and clean bronze into silver
    Silver {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
        /// Report what would be accepted and rejected without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Rebuild the gold tables from silver
    Gold {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
    },
    /// Validate pipeline configuration and connectivity
    Check {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
    },
    /// List the gold result sets
    Catalog {
        /// Include the SQL of each query
        #[arg(long)]
        sql: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Connection settings may come from a local .env file.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            pipeline,
            skip_bronze,
            skip_gold,
            json,
        } => commands::run::execute(&pipeline, skip_bronze, skip_gold, json).await,
        Commands::Bronze { pipeline } => commands::stages::bronze(&pipeline).await,
        Commands::Silver { pipeline, dry_run } => commands::stages::silver(&pipeline, dry_run).await,
        Commands::Gold { pipeline } => commands::stages::gold(&pipeline).await,
        Commands::Check { pipeline } => commands::check::execute(&pipeline).await,
        Commands::Catalog { sql } => {
            commands::catalog::execute(sql);
            Ok(())
        }
    }
}
