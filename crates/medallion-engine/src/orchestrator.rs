//! Pipeline orchestrator: sequences bronze, silver, and gold against the
//! configured stores and stops at the first failing stage.

use std::time::Instant;

use medallion_store::{
    BronzeSink, GoldSource, GoldTarget, PgWarehouse, RawSource, SilverSink,
};

use crate::bronze::load_bronze;
use crate::config::types::{DatabaseConfig, PipelineConfig};
use crate::errors::{PipelineError, Stage};
use crate::gold::{build_gold, Replica};
use crate::result::{BronzeReport, CheckResult, GoldReport, PipelineResult, SilverReport};
use crate::silver;

/// Which stages a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Reuse the bronze tables already in the warehouse.
    pub skip_bronze: bool,
    /// Stop after silver.
    pub skip_gold: bool,
}

fn log_failure(stage: Stage) -> impl FnOnce(PipelineError) -> PipelineError {
    move |err| {
        tracing::error!(stage = stage.as_str(), error = %err, "Stage failed, aborting run");
        err
    }
}

async fn connect(role: &str, db: &DatabaseConfig) -> Result<PgWarehouse, PipelineError> {
    let params = db.connection_params();
    PgWarehouse::connect(&params)
        .await
        .map_err(|source| PipelineError::Connect {
            store: format!("{role} {}", params.target()),
            source,
        })
}

/// Run the configured stages against already-connected stores.
///
/// `warehouse` holds bronze, silver, the audit log, and the local gold
/// schema. Gold is never attempted once silver has failed.
///
/// # Errors
///
/// Returns the first stage failure.
pub async fn execute_pipeline<W, R>(
    config: &PipelineConfig,
    warehouse: &mut W,
    replica: Option<Replica<'_, R>>,
    options: RunOptions,
) -> Result<PipelineResult, PipelineError>
where
    W: BronzeSink + RawSource + SilverSink + GoldSource + GoldTarget,
    R: GoldTarget,
{
    let start = Instant::now();
    tracing::info!(
        pipeline = config.pipeline.as_str(),
        skip_bronze = options.skip_bronze,
        skip_gold = options.skip_gold,
        "Starting pipeline run"
    );

    let bronze = if options.skip_bronze {
        tracing::info!("Skipping bronze stage");
        None
    } else {
        Some(
            load_bronze(warehouse, &config.bronze.input_dir)
                .await
                .map_err(log_failure(Stage::Bronze))?,
        )
    };

    silver::ensure_silver_schema(warehouse)
        .await
        .map_err(log_failure(Stage::Silver))?;
    let silver = silver::clean_and_load(warehouse)
        .await
        .map_err(log_failure(Stage::Silver))?;

    let gold = if options.skip_gold {
        tracing::info!("Skipping gold stage");
        None
    } else {
        Some(
            build_gold(warehouse, &config.gold.schema, replica)
                .await
                .map_err(log_failure(Stage::Gold))?,
        )
    };

    let duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        pipeline = config.pipeline.as_str(),
        accepted = silver.total_accepted(),
        rejected = silver.total_rejected(),
        audit_records = silver.audit_records_written,
        duration_secs,
        "Pipeline run completed"
    );

    Ok(PipelineResult {
        bronze,
        silver,
        gold,
        duration_secs,
    })
}

/// Connect to the configured PostgreSQL stores and run the pipeline.
///
/// # Errors
///
/// Returns an error if a store is unreachable or a stage fails.
pub async fn run_pipeline(
    config: &PipelineConfig,
    options: RunOptions,
) -> Result<PipelineResult, PipelineError> {
    let mut warehouse = connect("warehouse", &config.warehouse).await?;
    let replica_config = config.replica.as_ref().filter(|_| !options.skip_gold);
    let mut replica_store = match replica_config {
        Some(replica) => Some(connect("replica", &replica.connection).await?),
        None => None,
    };
    let replica = replica_store
        .as_mut()
        .zip(replica_config)
        .map(|(store, replica)| Replica {
            store,
            schema: replica.schema.as_str(),
        });
    execute_pipeline(config, &mut warehouse, replica, options).await
}

/// Load bronze only.
///
/// # Errors
///
/// Returns an error if the warehouse is unreachable or loading fails.
pub async fn run_bronze(config: &PipelineConfig) -> Result<BronzeReport, PipelineError> {
    let mut warehouse = connect("warehouse", &config.warehouse).await?;
    load_bronze(&mut warehouse, &config.bronze.input_dir)
        .await
        .map_err(log_failure(Stage::Bronze))
}

/// Run silver only. With `dry_run` nothing is written.
///
/// # Errors
///
/// Returns an error if the warehouse is unreachable or the stage fails.
pub async fn run_silver(
    config: &PipelineConfig,
    dry_run: bool,
) -> Result<SilverReport, PipelineError> {
    let mut warehouse = connect("warehouse", &config.warehouse).await?;
    if dry_run {
        return silver::preview(&mut warehouse)
            .await
            .map_err(log_failure(Stage::Silver));
    }
    silver::ensure_silver_schema(&mut warehouse)
        .await
        .map_err(log_failure(Stage::Silver))?;
    silver::clean_and_load(&mut warehouse)
        .await
        .map_err(log_failure(Stage::Silver))
}

/// Rebuild gold from the current silver layer.
///
/// # Errors
///
/// Returns an error if a store is unreachable or the stage fails.
pub async fn run_gold(config: &PipelineConfig) -> Result<GoldReport, PipelineError> {
    let mut warehouse = connect("warehouse", &config.warehouse).await?;
    match &config.replica {
        Some(replica) => {
            let mut store = connect("replica", &replica.connection).await?;
            build_gold(
                &mut warehouse,
                &config.gold.schema,
                Some(Replica {
                    store: &mut store,
                    schema: &replica.schema,
                }),
            )
            .await
        }
        None => build_gold::<_, PgWarehouse>(&mut warehouse, &config.gold.schema, None).await,
    }
    .map_err(log_failure(Stage::Gold))
}

async fn probe(role: &str, db: &DatabaseConfig) -> Result<(), String> {
    let mut store = connect(role, db).await.map_err(|e| e.to_string())?;
    store.ping().await.map_err(|e| e.to_string())?;
    tracing::info!(store = role, addr = store.target(), "Connection OK");
    Ok(())
}

/// Check connectivity to every configured store and the presence of
/// bronze input files.
pub async fn check_pipeline(config: &PipelineConfig) -> CheckResult {
    tracing::info!(pipeline = config.pipeline.as_str(), "Checking pipeline");

    let warehouse = probe("warehouse", &config.warehouse).await;
    let replica = match &config.replica {
        Some(replica) => Some(probe("replica", &replica.connection).await),
        None => None,
    };
    let input_files = medallion_types::TableName::ALL
        .into_iter()
        .map(|table| (table, config.bronze.input_dir.join(table.file_name()).exists()))
        .collect();

    CheckResult {
        warehouse,
        replica,
        input_files,
    }
}
