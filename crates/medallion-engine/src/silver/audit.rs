//! In-memory collector for audit records produced during one silver run.
//!
//! Records are buffered and only reach the audit sink together with the
//! silver tables, inside the publish transaction.

use std::collections::BTreeMap;

use chrono::Utc;
use medallion_types::{AuditRecord, RawRow, Reason, TableName};

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record snapshotting `raw` verbatim.
    pub fn record(&mut self, table: TableName, raw: &RawRow, reason: Reason) {
        self.records.push(AuditRecord {
            table,
            rejected_data: raw.to_json(table),
            reason,
            recorded_at: Utc::now(),
        });
    }

    #[must_use]
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record counts keyed by table and reason.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<(TableName, Reason), usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry((record.table, record.reason)).or_insert(0) += 1;
        }
        counts
    }
}
