//! DDL and column typing for the bronze, silver, and audit schemas.

use medallion_types::TableName;

use crate::error::{self, StoreError};

pub const BRONZE_SCHEMA: &str = "bronze";
pub const SILVER_SCHEMA: &str = "silver";
pub const AUDIT_SCHEMA: &str = "audit";
pub const AUDIT_TABLE: &str = "rejected_rows";

/// Idempotent DDL for the audit log.
pub const CREATE_AUDIT: &str = r"
CREATE SCHEMA IF NOT EXISTS audit;

CREATE TABLE IF NOT EXISTS audit.rejected_rows (
    id SERIAL PRIMARY KEY,
    table_name TEXT,
    rejected_data JSONB,
    reason TEXT,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

/// Idempotent DDL for the silver tables, parents first.
pub const CREATE_SILVER: &str = r"
CREATE SCHEMA IF NOT EXISTS silver;

CREATE TABLE IF NOT EXISTS silver.students (
    student_id NUMERIC PRIMARY KEY,
    name TEXT,
    email TEXT,
    city TEXT,
    signup_date DATE
);

CREATE TABLE IF NOT EXISTS silver.courses (
    course_id NUMERIC PRIMARY KEY,
    course_name TEXT,
    category TEXT,
    price NUMERIC,
    instructor TEXT
);

CREATE TABLE IF NOT EXISTS silver.enrollment (
    enrollment_id NUMERIC PRIMARY KEY,
    student_id NUMERIC REFERENCES silver.students(student_id),
    course_id NUMERIC REFERENCES silver.courses(course_id),
    enroll_date DATE,
    status TEXT
);

CREATE TABLE IF NOT EXISTS silver.assessment (
    assessment_id NUMERIC PRIMARY KEY,
    student_id NUMERIC REFERENCES silver.students(student_id),
    course_id NUMERIC REFERENCES silver.courses(course_id),
    score NUMERIC,
    attempt_date DATE
);

CREATE TABLE IF NOT EXISTS silver.payments (
    payment_id NUMERIC PRIMARY KEY,
    student_id NUMERIC REFERENCES silver.students(student_id),
    course_id NUMERIC REFERENCES silver.courses(course_id),
    amount NUMERIC,
    payment_date DATE,
    method TEXT
);
";

/// SQL type of a silver column.
#[must_use]
pub fn silver_column_type(column: &str) -> &'static str {
    if column.ends_with("_date") {
        "date"
    } else if column.ends_with("_id") || matches!(column, "price" | "score" | "amount") {
        "numeric"
    } else {
        "text"
    }
}

/// Idempotent DDL for one bronze table. Every column is `TEXT`: bronze
/// holds source values exactly as loaded.
#[must_use]
pub fn create_bronze_table(table: TableName) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|c| format!("    {c} TEXT"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS {BRONZE_SCHEMA}.{table} (\n{columns}\n)")
}

/// `INSERT` for one table where every parameter is bound as text and cast
/// to the column type on the server.
#[must_use]
pub fn insert_statement(
    qualified_table: &str,
    columns: &[&str],
    cast: impl Fn(&str) -> String,
) -> String {
    let placeholders = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("${}::text{}", i + 1, cast(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {qualified_table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

/// Check that a configured schema/table name is a plain PostgreSQL
/// identifier before it is interpolated into DDL.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] describing the first problem.
pub fn validate_identifier(name: &str) -> error::Result<()> {
    let invalid = |reason: String| StoreError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("identifier must not be empty".to_string()));
    };
    if name.len() > 63 {
        return Err(invalid(format!(
            "exceeds PostgreSQL maximum length of 63 bytes (got {})",
            name.len()
        )));
    }
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(invalid(format!(
            "identifier must start with a letter or underscore, got '{first}'"
        )));
    }
    if let Some(ch) = chars.find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(invalid(format!("identifier contains invalid character '{ch}'")));
    }
    Ok(())
}
