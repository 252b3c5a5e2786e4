//! Cleaned silver records.
//!
//! These are the shapes that survive validation. Fields the rules never
//! constrain (`course_name`, `instructor`, the dates) stay optional;
//! constrained fields carry their validated type.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::numeric::Numeric;
use crate::table::TableName;

const DATE_FMT: &str = "%Y-%m-%d";

fn date_cell(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FMT).to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: Numeric,
    pub name: Option<String>,
    pub email: Option<String>,
    pub city: String,
    pub signup_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: Numeric,
    pub course_name: Option<String>,
    pub category: Option<String>,
    pub price: Numeric,
    pub instructor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub enrollment_id: Numeric,
    pub student_id: Numeric,
    pub course_id: Numeric,
    pub enroll_date: Option<NaiveDate>,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: Numeric,
    pub student_id: Numeric,
    pub course_id: Numeric,
    pub score: Numeric,
    pub attempt_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: Numeric,
    pub student_id: Numeric,
    pub course_id: Numeric,
    pub amount: Numeric,
    pub payment_date: Option<NaiveDate>,
    pub method: PaymentMethod,
}

/// Allowed enrollment states. Matching is exact: no trimming or case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "dropped" => Ok(Self::Dropped),
            other => Err(format!("invalid enrollment status '{other}'")),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed payment methods, in their normalized (title-cased) spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    Upi,
    Netbanking,
    Paypal,
    Cash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 7] = [
        Self::CreditCard,
        Self::DebitCard,
        Self::Upi,
        Self::Netbanking,
        Self::Paypal,
        Self::Cash,
        Self::BankTransfer,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::Upi => "Upi",
            Self::Netbanking => "Netbanking",
            Self::Paypal => "Paypal",
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank Transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// Exact match against the normalized spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("invalid payment method '{s}'"))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that can be written to its silver table.
pub trait SilverRecord {
    const TABLE: TableName;

    /// Cells in [`TableName::columns`] order, rendered as text.
    fn silver_values(&self) -> Vec<Option<String>>;
}

impl SilverRecord for Student {
    const TABLE: TableName = TableName::Students;

    fn silver_values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.student_id.to_string()),
            self.name.clone(),
            self.email.clone(),
            Some(self.city.clone()),
            date_cell(self.signup_date),
        ]
    }
}

impl SilverRecord for Course {
    const TABLE: TableName = TableName::Courses;

    fn silver_values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.course_id.to_string()),
            self.course_name.clone(),
            self.category.clone(),
            Some(self.price.to_string()),
            self.instructor.clone(),
        ]
    }
}

impl SilverRecord for Enrollment {
    const TABLE: TableName = TableName::Enrollment;

    fn silver_values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.enrollment_id.to_string()),
            Some(self.student_id.to_string()),
            Some(self.course_id.to_string()),
            date_cell(self.enroll_date),
            Some(self.status.to_string()),
        ]
    }
}

impl SilverRecord for Assessment {
    const TABLE: TableName = TableName::Assessment;

    fn silver_values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.assessment_id.to_string()),
            Some(self.student_id.to_string()),
            Some(self.course_id.to_string()),
            Some(self.score.to_string()),
            date_cell(self.attempt_date),
        ]
    }
}

impl SilverRecord for Payment {
    const TABLE: TableName = TableName::Payments;

    fn silver_values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.payment_id.to_string()),
            Some(self.student_id.to_string()),
            Some(self.course_id.to_string()),
            Some(self.amount.to_string()),
            date_cell(self.payment_date),
            Some(self.method.to_string()),
        ]
    }
}

/// The complete output of one silver run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SilverLayer {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub enrollment: Vec<Enrollment>,
    pub assessment: Vec<Assessment>,
    pub payments: Vec<Payment>,
}

impl SilverLayer {
    /// Row count for one table.
    #[must_use]
    pub fn row_count(&self, table: TableName) -> usize {
        match table {
            TableName::Students => self.students.len(),
            TableName::Courses => self.courses.len(),
            TableName::Enrollment => self.enrollment.len(),
            TableName::Assessment => self.assessment.len(),
            TableName::Payments => self.payments.len(),
        }
    }

    /// Total rows across all five tables.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        TableName::ALL.iter().map(|t| self.row_count(*t)).sum()
    }

    /// Text rows for one table, in column order.
    #[must_use]
    pub fn table_values(&self, table: TableName) -> Vec<Vec<Option<String>>> {
        fn rows<R: SilverRecord>(records: &[R]) -> Vec<Vec<Option<String>>> {
            records.iter().map(SilverRecord::silver_values).collect()
        }
        match table {
            TableName::Students => rows(&self.students),
            TableName::Courses => rows(&self.courses),
            TableName::Enrollment => rows(&self.enrollment),
            TableName::Assessment => rows(&self.assessment),
            TableName::Payments => rows(&self.payments),
        }
    }
}
