//! Silver stage: validate and clean the bronze snapshot, divert rejected
//! rows to the audit log, and publish the result atomically.
//!
//! [`clean`] is pure and synchronous. [`clean_and_load`] wraps it with the
//! store round-trips: read every bronze table, clean, then one
//! [`SilverSink::publish_silver`] call that replaces all five silver tables
//! and appends the audit records in a single transaction.

pub mod audit;
pub mod coerce;
mod integrity;
mod rules;
mod tables;

use std::collections::BTreeMap;
use std::time::Instant;

use medallion_store::{RawSource, SilverSink};
use medallion_types::{RawRow, RawTable, SilverLayer, TableName};

pub use self::audit::AuditLog;
use self::integrity::{cascade, ParentKeys};
use self::rules::Tracked;
use crate::errors::{PipelineError, Stage};
use crate::result::{SilverReport, TableReport};

/// All five bronze tables as read at the start of a silver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot {
    tables: BTreeMap<TableName, RawTable>,
}

impl RawSnapshot {
    /// Build a snapshot; tables not supplied are treated as empty.
    #[must_use]
    pub fn new(tables: impl IntoIterator<Item = RawTable>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.table, t)).collect(),
        }
    }

    /// Rows of one bronze table.
    #[must_use]
    pub fn table(&self, table: TableName) -> &[RawRow] {
        self.tables
            .get(&table)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(RawTable::len).sum()
    }
}

/// Output of one cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub silver: SilverLayer,
    pub audit: AuditLog,
    /// One report per table, in dependency order.
    pub tables: Vec<TableReport>,
}

fn records<R>(rows: Vec<Tracked<R>>) -> Vec<R> {
    rows.into_iter().map(|row| row.record).collect()
}

/// Run every per-table pipeline and the foreign key pass over `snapshot`.
///
/// Parents are cleaned before children; the foreign key pass runs last,
/// against the parent keys that survived.
#[must_use]
pub fn clean(snapshot: &RawSnapshot) -> CleanOutcome {
    let mut audit = AuditLog::new();

    let (students, students_report) =
        tables::clean_students(snapshot.table(TableName::Students), &mut audit);
    let (courses, courses_report) =
        tables::clean_courses(snapshot.table(TableName::Courses), &mut audit);
    let enrollment = tables::clean_enrollment(snapshot.table(TableName::Enrollment), &mut audit);
    let assessment = tables::clean_assessment(snapshot.table(TableName::Assessment), &mut audit);
    let payments = tables::clean_payments(snapshot.table(TableName::Payments), &mut audit);

    let keys = ParentKeys::collect(&students, &courses);
    let (enrollment, enrollment_report) = cascade(enrollment, &keys, &mut audit);
    let (assessment, assessment_report) = cascade(assessment, &keys, &mut audit);
    let (payments, payments_report) = cascade(payments, &keys, &mut audit);

    CleanOutcome {
        silver: SilverLayer {
            students: records(students),
            courses: records(courses),
            enrollment: records(enrollment),
            assessment: records(assessment),
            payments: records(payments),
        },
        audit,
        tables: vec![
            students_report,
            courses_report,
            enrollment_report,
            assessment_report,
            payments_report,
        ],
    }
}

/// Idempotently create the silver and audit schemas.
///
/// # Errors
///
/// Returns an error if the store rejects the DDL.
pub async fn ensure_silver_schema<S: SilverSink>(store: &mut S) -> Result<(), PipelineError> {
    store
        .ensure_silver_schema()
        .await
        .map_err(|e| PipelineError::store(Stage::Silver, "ensure silver schema", e))
}

/// Read every bronze table.
///
/// # Errors
///
/// Returns an error on the first table that cannot be read.
pub async fn read_snapshot<S: RawSource>(store: &mut S) -> Result<RawSnapshot, PipelineError> {
    let mut tables = Vec::with_capacity(TableName::ALL.len());
    for table in TableName::ALL {
        let raw = store
            .read_raw_table(table)
            .await
            .map_err(|e| PipelineError::store(Stage::Silver, format!("read bronze.{table}"), e))?;
        tracing::debug!(table = %table, rows = raw.len(), "Read bronze table");
        tables.push(raw);
    }
    Ok(RawSnapshot::new(tables))
}

fn log_outcome(outcome: &CleanOutcome) {
    for report in &outcome.tables {
        tracing::info!(
            table = %report.table,
            input = report.input_rows,
            accepted = report.accepted,
            rejected = report.rejected,
            flagged = report.flagged,
            duplicates = report.duplicates_removed,
            "Cleaned silver table"
        );
    }
    for ((table, reason), count) in outcome.audit.counts() {
        tracing::debug!(table = %table, reason = reason.as_str(), count, "Audit records");
    }
}

fn summarize(outcome: &CleanOutcome, start: Instant) -> SilverReport {
    SilverReport {
        tables: outcome.tables.clone(),
        audit_records: outcome.audit.len(),
        rows_written: 0,
        audit_records_written: 0,
        duration_secs: start.elapsed().as_secs_f64(),
    }
}

/// Validate, reject, normalize, and write the silver layer.
///
/// Nothing is written unless the whole run succeeds: the silver tables and
/// the audit records are published in one transaction.
///
/// # Errors
///
/// Returns an error if reading bronze or publishing silver fails; the
/// previous silver contents stay visible.
pub async fn clean_and_load<S: RawSource + SilverSink>(
    store: &mut S,
) -> Result<SilverReport, PipelineError> {
    let start = Instant::now();
    let snapshot = read_snapshot(store).await?;
    tracing::info!(rows = snapshot.total_rows(), "Silver run started");

    let outcome = clean(&snapshot);
    log_outcome(&outcome);

    let stats = store
        .publish_silver(&outcome.silver, outcome.audit.records())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Silver publish failed, previous silver layer kept");
            PipelineError::store(Stage::Silver, "publish silver layer", e)
        })?;
    tracing::info!(
        rows_written = stats.rows_written,
        audit_records = stats.audit_records_written,
        "Silver layer published"
    );

    let mut report = summarize(&outcome, start);
    report.rows_written = stats.rows_written;
    report.audit_records_written = stats.audit_records_written;
    Ok(report)
}

/// Clean without publishing anything.
///
/// # Errors
///
/// Returns an error if reading bronze fails.
pub async fn preview<S: RawSource>(store: &mut S) -> Result<SilverReport, PipelineError> {
    let start = Instant::now();
    let snapshot = read_snapshot(store).await?;
    let outcome = clean(&snapshot);
    log_outcome(&outcome);
    Ok(summarize(&outcome, start))
}
