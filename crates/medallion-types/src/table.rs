//! Identities of the five pipeline tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five entity tables that exist in every layer.
///
/// Declaration order is dependency order: parents (`Students`, `Courses`)
/// come before the tables that reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Students,
    Courses,
    Enrollment,
    Assessment,
    Payments,
}

impl TableName {
    /// All tables in dependency order.
    pub const ALL: [TableName; 5] = [
        Self::Students,
        Self::Courses,
        Self::Enrollment,
        Self::Assessment,
        Self::Payments,
    ];

    /// Unqualified table name, identical in every schema.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Courses => "courses",
            Self::Enrollment => "enrollment",
            Self::Assessment => "assessment",
            Self::Payments => "payments",
        }
    }

    /// Primary key column.
    #[must_use]
    pub fn primary_key(self) -> &'static str {
        match self {
            Self::Students => "student_id",
            Self::Courses => "course_id",
            Self::Enrollment => "enrollment_id",
            Self::Assessment => "assessment_id",
            Self::Payments => "payment_id",
        }
    }

    /// Entity columns in canonical order. The primary key is always first.
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Students => &["student_id", "name", "email", "city", "signup_date"],
            Self::Courses => &["course_id", "course_name", "category", "price", "instructor"],
            Self::Enrollment => &[
                "enrollment_id",
                "student_id",
                "course_id",
                "enroll_date",
                "status",
            ],
            Self::Assessment => &[
                "assessment_id",
                "student_id",
                "course_id",
                "score",
                "attempt_date",
            ],
            Self::Payments => &[
                "payment_id",
                "student_id",
                "course_id",
                "amount",
                "payment_date",
                "method",
            ],
        }
    }

    /// Position of `column` in [`columns`](Self::columns).
    #[must_use]
    pub fn column_index(self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    /// Name of the CSV file that feeds this table's bronze load.
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Whether this table carries `student_id`/`course_id` references.
    #[must_use]
    pub fn has_foreign_keys(self) -> bool {
        matches!(self, Self::Enrollment | Self::Assessment | Self::Payments)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown table '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_is_first_column() {
        for table in TableName::ALL {
            assert_eq!(table.columns()[0], table.primary_key(), "{table}");
        }
    }

    #[test]
    fn parse_roundtrips_display() {
        for table in TableName::ALL {
            assert_eq!(table.to_string().parse::<TableName>().unwrap(), table);
        }
        assert!("bronze".parse::<TableName>().is_err());
    }

    #[test]
    fn only_children_have_foreign_keys() {
        assert!(!TableName::Students.has_foreign_keys());
        assert!(!TableName::Courses.has_foreign_keys());
        assert!(TableName::Payments.has_foreign_keys());
        assert_eq!(TableName::Payments.column_index("method"), Some(5));
    }
}
