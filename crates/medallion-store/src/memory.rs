//! In-memory warehouse used by tests.
//!
//! Mirrors the transactional contract of [`PgWarehouse`](crate::PgWarehouse):
//! a publish either replaces the whole silver layer and appends the audit
//! records, or (when a failure is injected) changes nothing.

use std::collections::BTreeMap;

use medallion_types::{AuditRecord, GoldResult, RawTable, SilverLayer, TableName};

use crate::backend::{BronzeSink, GoldSource, GoldTarget, PublishStats, RawSource, SilverSink};
use crate::error::{self, StoreError};
use crate::schema::validate_identifier;

/// A warehouse whose tables live in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryWarehouse {
    bronze: BTreeMap<TableName, RawTable>,
    silver: SilverLayer,
    audit: Vec<AuditRecord>,
    gold: BTreeMap<(String, String), GoldResult>,
    gold_schemas: Vec<String>,
    gold_queries: Vec<String>,
    gold_results: BTreeMap<String, GoldResult>,
    fail_publish: bool,
    fail_gold_query: bool,
}

impl MemoryWarehouse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one bronze table, replacing whatever was there.
    #[must_use]
    pub fn with_bronze(mut self, rows: RawTable) -> Self {
        self.bronze.insert(rows.table, rows);
        self
    }

    /// Make every subsequent [`SilverSink::publish_silver`] fail before it
    /// touches any state.
    #[must_use]
    pub fn failing_on_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    /// Make every subsequent [`GoldSource::run_gold_query`] fail.
    #[must_use]
    pub fn failing_on_gold_query(mut self) -> Self {
        self.fail_gold_query = true;
        self
    }

    /// Canned result returned when `sql` is run as a gold query.
    #[must_use]
    pub fn with_gold_result(mut self, sql: impl Into<String>, result: GoldResult) -> Self {
        self.gold_results.insert(sql.into(), result);
        self
    }

    /// Current contents of a bronze table, if it was ever loaded.
    #[must_use]
    pub fn bronze(&self, table: TableName) -> Option<&RawTable> {
        self.bronze.get(&table)
    }

    /// The last published silver layer.
    #[must_use]
    pub fn silver(&self) -> &SilverLayer {
        &self.silver
    }

    /// Every audit record appended so far, oldest first.
    #[must_use]
    pub fn audit(&self) -> &[AuditRecord] {
        &self.audit
    }

    /// A materialized gold table.
    #[must_use]
    pub fn gold_table(&self, schema: &str, name: &str) -> Option<&GoldResult> {
        self.gold.get(&(schema.to_string(), name.to_string()))
    }

    /// Number of materialized gold tables across all schemas.
    #[must_use]
    pub fn gold_table_count(&self) -> usize {
        self.gold.len()
    }

    /// Gold schemas ensured so far.
    #[must_use]
    pub fn gold_schemas(&self) -> &[String] {
        &self.gold_schemas
    }

    /// SQL of every gold query run so far, in order.
    #[must_use]
    pub fn gold_queries(&self) -> &[String] {
        &self.gold_queries
    }
}

impl RawSource for MemoryWarehouse {
    async fn read_raw_table(&mut self, table: TableName) -> error::Result<RawTable> {
        Ok(self
            .bronze
            .get(&table)
            .cloned()
            .unwrap_or_else(|| RawTable::empty(table)))
    }
}

impl BronzeSink for MemoryWarehouse {
    async fn ensure_bronze_schema(&mut self) -> error::Result<()> {
        Ok(())
    }

    async fn reload_bronze_table(&mut self, rows: &RawTable) -> error::Result<u64> {
        self.bronze.insert(rows.table, rows.clone());
        Ok(rows.len() as u64)
    }
}

impl SilverSink for MemoryWarehouse {
    async fn ensure_silver_schema(&mut self) -> error::Result<()> {
        Ok(())
    }

    async fn publish_silver(
        &mut self,
        silver: &SilverLayer,
        audit: &[AuditRecord],
    ) -> error::Result<PublishStats> {
        if self.fail_publish {
            return Err(StoreError::Simulated("publish silver".to_string()));
        }
        self.silver = silver.clone();
        self.audit.extend_from_slice(audit);
        Ok(PublishStats {
            rows_written: silver.total_rows() as u64,
            audit_records_written: audit.len() as u64,
        })
    }
}

impl GoldSource for MemoryWarehouse {
    async fn run_gold_query(&mut self, sql: &str) -> error::Result<GoldResult> {
        if self.fail_gold_query {
            return Err(StoreError::Simulated("run gold query".to_string()));
        }
        self.gold_queries.push(sql.to_string());
        Ok(self.gold_results.get(sql).cloned().unwrap_or_default())
    }
}

impl GoldTarget for MemoryWarehouse {
    async fn ensure_gold_schema(&mut self, schema: &str) -> error::Result<()> {
        validate_identifier(schema)?;
        if !self.gold_schemas.iter().any(|s| s == schema) {
            self.gold_schemas.push(schema.to_string());
        }
        Ok(())
    }

    async fn replace_gold_table(
        &mut self,
        schema: &str,
        name: &str,
        result: &GoldResult,
    ) -> error::Result<u64> {
        validate_identifier(schema)?;
        validate_identifier(name)?;
        let expected = result.columns.len();
        if let Some((row, values)) = result
            .rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(StoreError::ShapeMismatch {
                table: name.to_string(),
                row,
                found: values.len(),
                expected,
            });
        }
        self.gold
            .insert((schema.to_string(), name.to_string()), result.clone());
        Ok(result.row_count() as u64)
    }
}
