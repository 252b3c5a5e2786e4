//! Ordered rule evaluation for one table.
//!
//! A [`TableRun`] carries the rows still in play, each paired with the raw
//! bronze row it came from. Every rule partitions those rows; rejected rows
//! are audited with the untouched raw snapshot and never seen by a later
//! rule.

use std::collections::HashSet;
use std::hash::Hash;

use medallion_types::{RawRow, Reason, TableName};

use crate::result::TableReport;
use crate::silver::audit::AuditLog;

/// A row in flight: its current typed form plus the original raw row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tracked<R> {
    pub(crate) raw: RawRow,
    pub(crate) record: R,
}

pub(crate) struct TableRun<'a, R> {
    table: TableName,
    rows: Vec<Tracked<R>>,
    audit: &'a mut AuditLog,
    report: TableReport,
}

fn log_rule(table: TableName, reason: Reason, count: usize) {
    if count > 0 {
        tracing::warn!(
            table = %table,
            reason = reason.as_str(),
            count,
            "{count} faulty rows in {table} - {reason}"
        );
    } else {
        tracing::debug!(table = %table, reason = reason.as_str(), "Rule matched no rows");
    }
}

impl<'a, R> TableRun<'a, R> {
    /// Start a run over the bronze rows of `table`, coercing each with `parse`.
    pub(crate) fn start(
        table: TableName,
        raw: &[RawRow],
        audit: &'a mut AuditLog,
        parse: impl Fn(&RawRow) -> R,
    ) -> Self {
        let rows = raw
            .iter()
            .map(|row| Tracked {
                raw: row.clone(),
                record: parse(row),
            })
            .collect();
        Self {
            table,
            rows,
            audit,
            report: TableReport::new(table, raw.len()),
        }
    }

    /// Continue a finished run with more rules.
    pub(crate) fn resume(
        rows: Vec<Tracked<R>>,
        audit: &'a mut AuditLog,
        report: TableReport,
    ) -> Self {
        Self {
            table: report.table,
            rows,
            audit,
            report,
        }
    }

    /// Keep the first row seen for each key. Rows without a key are kept.
    /// Discarded duplicates are not audited.
    pub(crate) fn dedup_by<K: Eq + Hash>(mut self, key: impl Fn(&R) -> Option<K>) -> Self {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows
            .retain(|row| key(&row.record).map_or(true, |k| seen.insert(k)));
        let removed = before - self.rows.len();
        if removed > 0 {
            tracing::info!(
                table = %self.table,
                duplicates = removed,
                "Discarded rows with a duplicate primary key"
            );
        }
        self.report.duplicates_removed += removed;
        self
    }

    /// Drop every row `is_bad` matches, auditing each with `reason`.
    pub(crate) fn reject_where(self, reason: Reason, is_bad: impl Fn(&R) -> bool) -> Self {
        self.refine(reason, |record| (!is_bad(&record)).then_some(record))
    }

    /// Convert every row with `f`; rows it maps to `None` are dropped and
    /// audited with `reason`.
    pub(crate) fn refine<S>(
        self,
        reason: Reason,
        mut f: impl FnMut(R) -> Option<S>,
    ) -> TableRun<'a, S> {
        let TableRun {
            table,
            rows,
            audit,
            mut report,
        } = self;

        let mut kept = Vec::with_capacity(rows.len());
        let mut rejected = 0;
        for Tracked { raw, record } in rows {
            match f(record) {
                Some(record) => kept.push(Tracked { raw, record }),
                None => {
                    audit.record(table, &raw, reason);
                    rejected += 1;
                }
            }
        }
        log_rule(table, reason, rejected);
        report.rejected += rejected;

        TableRun {
            table,
            rows: kept,
            audit,
            report,
        }
    }

    /// Audit every row `is_bad` matches with `reason`, keeping all rows.
    pub(crate) fn flag_where(mut self, reason: Reason, is_bad: impl Fn(&R) -> bool) -> Self {
        let mut flagged = 0;
        for row in &self.rows {
            if is_bad(&row.record) {
                self.audit.record(self.table, &row.raw, reason);
                flagged += 1;
            }
        }
        log_rule(self.table, reason, flagged);
        self.report.flagged += flagged;
        self
    }

    /// Rewrite every remaining row in place. Never audits.
    pub(crate) fn normalize(mut self, f: impl FnMut(&mut R)) -> Self {
        self.rows.iter_mut().map(|row| &mut row.record).for_each(f);
        self
    }

    /// Count kept rows whose `column` date is missing and warn about them.
    pub(crate) fn count_null_dates(mut self, column: &str, is_null: impl Fn(&R) -> bool) -> Self {
        let count = self.rows.iter().filter(|row| is_null(&row.record)).count();
        if count > 0 {
            tracing::warn!(
                table = %self.table,
                column,
                count,
                "Missing or unparseable dates kept as NULL"
            );
        }
        self.report.null_dates += count;
        self
    }

    pub(crate) fn finish(mut self) -> (Vec<Tracked<R>>, TableReport) {
        self.report.accepted = self.rows.len();
        (self.rows, self.report)
    }
}
