//! Gold stage: run every catalog query against silver and materialize the
//! results by full replace into the warehouse gold schema and, when
//! configured, a replica.

pub mod catalog;

use std::time::Instant;

use medallion_store::{GoldSource, GoldTarget};

pub use self::catalog::{GoldQuery, CATALOG};
use crate::errors::{PipelineError, Stage};
use crate::result::{GoldReport, GoldTableReport};

/// Second destination for gold tables.
pub struct Replica<'a, R> {
    pub store: &'a mut R,
    pub schema: &'a str,
}

/// Build every gold table.
///
/// Each result set is read once from the warehouse and written to the
/// warehouse `schema` and then to the replica. Tables are replaced one at a
/// time; a failure stops the stage and leaves later tables untouched.
///
/// # Errors
///
/// Returns an error on the first query or write that fails.
pub async fn build_gold<S, R>(
    warehouse: &mut S,
    schema: &str,
    mut replica: Option<Replica<'_, R>>,
) -> Result<GoldReport, PipelineError>
where
    S: GoldSource + GoldTarget,
    R: GoldTarget,
{
    let start = Instant::now();
    tracing::info!(
        schema,
        replica_schema = replica.as_ref().map(|r| r.schema),
        tables = CATALOG.len(),
        "Starting gold layer build"
    );

    warehouse
        .ensure_gold_schema(schema)
        .await
        .map_err(|e| PipelineError::store(Stage::Gold, format!("ensure schema {schema}"), e))?;
    if let Some(replica) = replica.as_mut() {
        replica
            .store
            .ensure_gold_schema(replica.schema)
            .await
            .map_err(|e| {
                PipelineError::store(
                    Stage::Gold,
                    format!("ensure replica schema {}", replica.schema),
                    e,
                )
            })?;
    }

    let mut tables = Vec::with_capacity(CATALOG.len());
    for query in CATALOG {
        tracing::debug!(table = query.name, "Building gold table");
        let result = warehouse
            .run_gold_query(query.sql)
            .await
            .map_err(|e| PipelineError::store(Stage::Gold, format!("query {}", query.name), e))?;

        let rows = warehouse
            .replace_gold_table(schema, query.name, &result)
            .await
            .map_err(|e| {
                PipelineError::store(Stage::Gold, format!("write {schema}.{}", query.name), e)
            })?;
        tracing::info!(table = query.name, schema, rows, "Gold table built");

        let replica_rows = match replica.as_mut() {
            Some(replica) => {
                let rows = replica
                    .store
                    .replace_gold_table(replica.schema, query.name, &result)
                    .await
                    .map_err(|e| {
                        PipelineError::store(
                            Stage::Gold,
                            format!("write replica {}.{}", replica.schema, query.name),
                            e,
                        )
                    })?;
                tracing::info!(
                    table = query.name,
                    schema = replica.schema,
                    rows,
                    "Gold table copied to replica"
                );
                Some(rows)
            }
            None => None,
        };

        tables.push(GoldTableReport {
            name: query.name,
            rows,
            replica_rows,
        });
    }

    tracing::info!(tables = tables.len(), "Gold layer build completed");
    Ok(GoldReport {
        schema: schema.to_string(),
        replica_schema: replica.map(|r| r.schema.to_string()),
        tables,
        duration_secs: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use medallion_store::MemoryWarehouse;
    use medallion_types::{GoldColumn, GoldResult};

    use super::*;

    fn one_row() -> GoldResult {
        GoldResult {
            columns: vec![GoldColumn {
                name: "course_name".into(),
                pg_type: "text".into(),
            }],
            rows: vec![vec![Some("Rust".into())]],
        }
    }

    #[tokio::test]
    async fn builds_every_catalog_table_locally() {
        let sql = catalog::find("pass_fail_rate").unwrap().sql;
        let mut warehouse = MemoryWarehouse::new().with_gold_result(sql, one_row());

        let report = build_gold::<_, MemoryWarehouse>(&mut warehouse, "gold", None)
            .await
            .unwrap();

        assert_eq!(report.tables.len(), CATALOG.len());
        assert_eq!(warehouse.gold_table_count(), CATALOG.len());
        assert_eq!(warehouse.gold_queries().len(), CATALOG.len());
        assert_eq!(
            warehouse.gold_table("gold", "pass_fail_rate"),
            Some(&one_row())
        );
        assert!(report.tables.iter().all(|t| t.replica_rows.is_none()));
        assert_eq!(report.replica_schema, None);
    }

    #[tokio::test]
    async fn replica_receives_same_results() {
        let sql = catalog::find("student_overview").unwrap().sql;
        let mut warehouse = MemoryWarehouse::new().with_gold_result(sql, one_row());
        let mut replica = MemoryWarehouse::new();

        let report = build_gold(
            &mut warehouse,
            "gold",
            Some(Replica {
                store: &mut replica,
                schema: "public",
            }),
        )
        .await
        .unwrap();

        assert_eq!(report.replica_schema.as_deref(), Some("public"));
        assert_eq!(replica.gold_schemas(), ["public"]);
        assert_eq!(replica.gold_table_count(), CATALOG.len());
        assert_eq!(
            replica.gold_table("public", "student_overview"),
            Some(&one_row())
        );
        // The replica is never queried.
        assert!(replica.gold_queries().is_empty());
    }

    #[tokio::test]
    async fn query_failure_stops_the_stage() {
        let mut warehouse = MemoryWarehouse::new().failing_on_gold_query();
        let err = build_gold::<_, MemoryWarehouse>(&mut warehouse, "gold", None)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Gold));
        assert_eq!(warehouse.gold_table_count(), 0);
    }
}
