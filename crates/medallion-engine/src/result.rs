//! Per-stage and whole-run result types.

use medallion_types::TableName;

/// Outcome of cleaning one silver table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: TableName,
    /// Rows read from bronze.
    pub input_rows: usize,
    /// Rows silently discarded as duplicate primary keys.
    pub duplicates_removed: usize,
    /// Rows dropped by a reject rule, including the FK pass.
    pub rejected: usize,
    /// Rows audited by a flag rule but kept.
    pub flagged: usize,
    /// Kept rows whose date column could not be parsed.
    pub null_dates: usize,
    /// Rows written to silver.
    pub accepted: usize,
}

impl TableReport {
    #[must_use]
    pub fn new(table: TableName, input_rows: usize) -> Self {
        Self {
            table,
            input_rows,
            duplicates_removed: 0,
            rejected: 0,
            flagged: 0,
            null_dates: 0,
            accepted: 0,
        }
    }
}

/// Result of the silver stage.
#[derive(Debug, Clone, PartialEq)]
pub struct SilverReport {
    /// One entry per table, in dependency order.
    pub tables: Vec<TableReport>,
    /// Audit records produced by this run.
    pub audit_records: usize,
    /// Rows written across all silver tables (zero for a dry run).
    pub rows_written: u64,
    /// Audit records appended to the audit log (zero for a dry run).
    pub audit_records_written: u64,
    pub duration_secs: f64,
}

impl SilverReport {
    /// Report for one table.
    #[must_use]
    pub fn table(&self, table: TableName) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == table)
    }

    #[must_use]
    pub fn total_accepted(&self) -> usize {
        self.tables.iter().map(|t| t.accepted).sum()
    }

    #[must_use]
    pub fn total_rejected(&self) -> usize {
        self.tables.iter().map(|t| t.rejected).sum()
    }
}

/// Outcome of loading one bronze CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BronzeTableReport {
    pub table: TableName,
    /// `None` when the input file was absent and the table was skipped.
    pub rows_loaded: Option<u64>,
    /// Hex SHA-256 of the input file.
    pub checksum: Option<String>,
}

/// Result of the bronze stage.
#[derive(Debug, Clone, PartialEq)]
pub struct BronzeReport {
    pub tables: Vec<BronzeTableReport>,
    pub duration_secs: f64,
}

impl BronzeReport {
    #[must_use]
    pub fn rows_loaded(&self) -> u64 {
        self.tables.iter().filter_map(|t| t.rows_loaded).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.tables.iter().filter(|t| t.rows_loaded.is_none()).count()
    }
}

/// One materialized gold table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldTableReport {
    pub name: &'static str,
    pub rows: u64,
    /// Rows written to the replica, when one is configured.
    pub replica_rows: Option<u64>,
}

/// Result of the gold stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldReport {
    pub schema: String,
    pub replica_schema: Option<String>,
    pub tables: Vec<GoldTableReport>,
    pub duration_secs: f64,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub bronze: Option<BronzeReport>,
    pub silver: SilverReport,
    pub gold: Option<GoldReport>,
    pub duration_secs: f64,
}

/// Result of `check`: which configured stores answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub warehouse: Result<(), String>,
    pub replica: Option<Result<(), String>>,
    pub input_files: Vec<(TableName, bool)>,
}

impl CheckResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.warehouse.is_ok() && self.replica.as_ref().map_or(true, Result::is_ok)
    }
}
