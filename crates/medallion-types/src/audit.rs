//! Audit records for rows the silver engine rejected or flagged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::TableName;

/// Why a row was written to the audit log.
///
/// The `Display` text is the exact reason string stored in
/// `audit.rejected_rows.reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Reason {
    NonNumericStudentId,
    NonNumericCourseId,
    NonNumericEnrollmentId,
    NonNumericAssessmentId,
    NonNumericPaymentId,
    MissingCity,
    WhitespaceInEmail,
    InvalidNameCasing,
    NonNumericPrice,
    InvalidCategoryCasing,
    PriceOutOfRange,
    NonNumericForeignKey,
    InvalidStatus,
    NonNumericScore,
    ScoreOutOfRange,
    NonNumericAmount,
    AmountOutOfRange,
    InvalidMethod,
    InvalidForeignKey,
}

impl Reason {
    pub const ALL: [Reason; 19] = [
        Self::NonNumericStudentId,
        Self::NonNumericCourseId,
        Self::NonNumericEnrollmentId,
        Self::NonNumericAssessmentId,
        Self::NonNumericPaymentId,
        Self::MissingCity,
        Self::WhitespaceInEmail,
        Self::InvalidNameCasing,
        Self::NonNumericPrice,
        Self::InvalidCategoryCasing,
        Self::PriceOutOfRange,
        Self::NonNumericForeignKey,
        Self::InvalidStatus,
        Self::NonNumericScore,
        Self::ScoreOutOfRange,
        Self::NonNumericAmount,
        Self::AmountOutOfRange,
        Self::InvalidMethod,
        Self::InvalidForeignKey,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonNumericStudentId => "Non-numeric student_id",
            Self::NonNumericCourseId => "Non-numeric course_id",
            Self::NonNumericEnrollmentId => "Non-numeric enrollment_id",
            Self::NonNumericAssessmentId => "Non-numeric assessment_id",
            Self::NonNumericPaymentId => "Non-numeric payment_id",
            Self::MissingCity => "Missing city",
            Self::WhitespaceInEmail => "Whitespace in email",
            Self::InvalidNameCasing => "Invalid casing in name",
            Self::NonNumericPrice => "Non-numeric price",
            Self::InvalidCategoryCasing => "Invalid casing in category",
            Self::PriceOutOfRange => "Price out of range [50,500]",
            Self::NonNumericForeignKey => "Non-numeric student_id/course_id",
            Self::InvalidStatus => "Invalid status enum",
            Self::NonNumericScore => "Non-numeric score",
            Self::ScoreOutOfRange => "Score out of range [0,100]",
            Self::NonNumericAmount => "Non-numeric amount",
            Self::AmountOutOfRange => "Amount out of range [50,500]",
            Self::InvalidMethod => "Invalid method enum",
            Self::InvalidForeignKey => "Invalid FK student_id/course_id",
        }
    }

    /// The "non-numeric primary key" reason for `table`.
    #[must_use]
    pub fn non_numeric_key(table: TableName) -> Self {
        match table {
            TableName::Students => Self::NonNumericStudentId,
            TableName::Courses => Self::NonNumericCourseId,
            TableName::Enrollment => Self::NonNumericEnrollmentId,
            TableName::Assessment => Self::NonNumericAssessmentId,
            TableName::Payments => Self::NonNumericPaymentId,
        }
    }

    /// `false` for the log-and-keep reasons: the row was audited but
    /// normalized and kept rather than dropped.
    #[must_use]
    pub fn drops_row(self) -> bool {
        !matches!(
            self,
            Self::WhitespaceInEmail | Self::InvalidNameCasing | Self::InvalidCategoryCasing
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Reason> for String {
    fn from(reason: Reason) -> Self {
        reason.as_str().to_string()
    }
}

impl TryFrom<String> for Reason {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == value)
            .ok_or_else(|| format!("unknown audit reason '{value}'"))
    }
}

/// One row of `audit.rejected_rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub table: TableName,
    /// The original bronze row, verbatim, as a JSON object.
    pub rejected_data: serde_json::Value,
    pub reason: Reason,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for reason in Reason::ALL {
            assert!(seen.insert(reason.as_str()), "duplicate: {reason}");
        }
    }

    #[test]
    fn reason_serializes_as_text() {
        let json = serde_json::to_string(&Reason::AmountOutOfRange).unwrap();
        assert_eq!(json, "\"Amount out of range [50,500]\"");
        let back: Reason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Reason::AmountOutOfRange);
    }

    #[test]
    fn only_casing_and_whitespace_keep_the_row() {
        let kept: Vec<_> = Reason::ALL.into_iter().filter(|r| !r.drops_row()).collect();
        assert_eq!(
            kept,
            vec![
                Reason::WhitespaceInEmail,
                Reason::InvalidNameCasing,
                Reason::InvalidCategoryCasing
            ]
        );
    }
}
