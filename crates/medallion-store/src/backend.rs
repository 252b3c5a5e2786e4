//! Store trait definitions.
//!
//! The engine only ever sees these traits. Each stage needs a narrow slice
//! of a warehouse: the silver engine reads raw tables and publishes one
//! silver snapshot, the gold stage runs queries and replaces result tables.
//!
//! All methods are `async` and take `&mut self`; a run drives one store
//! at a time from a single task.

// The engine awaits these from one task and never needs `Send` bounds on
// the returned futures.
#![allow(async_fn_in_trait)]

use medallion_types::{AuditRecord, GoldResult, RawTable, SilverLayer, TableName};

use crate::error;

/// Read access to bronze tables.
pub trait RawSource {
    /// Read every row of a bronze table as text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn read_raw_table(&mut self, table: TableName) -> error::Result<RawTable>;
}

/// Write access to bronze tables.
pub trait BronzeSink {
    /// Idempotently create the bronze schema and its tables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn ensure_bronze_schema(&mut self) -> error::Result<()>;

    /// Truncate one bronze table and load `rows` in a single transaction.
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure; the
    /// previous table contents are left intact.
    async fn reload_bronze_table(&mut self, rows: &RawTable) -> error::Result<u64>;
}

/// Counts reported by [`SilverSink::publish_silver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub rows_written: u64,
    pub audit_records_written: u64,
}

/// Write access to the silver layer and the audit log.
pub trait SilverSink {
    /// Idempotently create the `silver` and `audit` schemas and tables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn ensure_silver_schema(&mut self) -> error::Result<()>;

    /// Replace the silver tables with `silver` and append `audit` to the
    /// audit log, atomically.
    ///
    /// Either every truncate, insert, and audit append becomes visible, or
    /// none of them do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn publish_silver(
        &mut self,
        silver: &SilverLayer,
        audit: &[AuditRecord],
    ) -> error::Result<PublishStats>;
}

/// Runs gold queries against a completed silver layer.
pub trait GoldSource {
    /// Execute a read-only query and materialize its result as text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn run_gold_query(&mut self, sql: &str) -> error::Result<GoldResult>;
}

/// Destination for materialized gold tables.
pub trait GoldTarget {
    /// Idempotently create `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn ensure_gold_schema(&mut self, schema: &str) -> error::Result<()>;

    /// Drop `schema.name` if present and recreate it from `result`.
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) on storage failure.
    async fn replace_gold_table(
        &mut self,
        schema: &str,
        name: &str,
        result: &GoldResult,
    ) -> error::Result<u64>;
}
