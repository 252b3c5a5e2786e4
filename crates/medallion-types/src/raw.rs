//! Untyped bronze rows.
//!
//! Bronze data is kept exactly as loaded: every cell is optional text.
//! Coercion happens in the silver engine, which keeps the original
//! [`RawRow`] alongside each parsed record so rejections can be audited
//! with the verbatim source values.

use serde_json::{Map, Value};

use crate::table::TableName;

/// One bronze row, cells aligned with [`TableName::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    values: Vec<Option<String>>,
}

impl RawRow {
    /// Build a row from cells in canonical column order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| v.map(Into::into)).collect(),
        }
    }

    /// Cell at `index`, or `None` when null or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Cell for `column` of `table`.
    #[must_use]
    pub fn field(&self, table: TableName, column: &str) -> Option<&str> {
        table.column_index(column).and_then(|i| self.get(i))
    }

    /// All cells in column order.
    #[must_use]
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// JSON object snapshot keyed by column name, in column order.
    ///
    /// Nulls stay `null`; every present value is a JSON string because
    /// that is what the bronze layer holds.
    #[must_use]
    pub fn to_json(&self, table: TableName) -> Value {
        let mut object = Map::with_capacity(table.columns().len());
        for (i, column) in table.columns().iter().enumerate() {
            let value = self
                .get(i)
                .map_or(Value::Null, |v| Value::String(v.to_string()));
            object.insert((*column).to_string(), value);
        }
        Value::Object(object)
    }
}

/// A whole bronze table as read from the raw store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub table: TableName,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    #[must_use]
    pub fn new(table: TableName, rows: Vec<RawRow>) -> Self {
        Self { table, rows }
    }

    #[must_use]
    pub fn empty(table: TableName) -> Self {
        Self::new(table, Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_snapshot_keeps_column_order_and_nulls() {
        let row = RawRow::new([Some("5"), Some("john smith"), Some(" j@x.com "), None, None]);
        let json = row.to_json(TableName::Students);
        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            r#"{"student_id":"5","name":"john smith","email":" j@x.com ","city":null,"signup_date":null}"#
        );
    }

    #[test]
    fn short_rows_read_as_null() {
        let row = RawRow::new([Some("1")]);
        assert_eq!(row.field(TableName::Courses, "course_id"), Some("1"));
        assert_eq!(row.field(TableName::Courses, "price"), None);
        assert_eq!(row.field(TableName::Courses, "no_such_column"), None);
    }
}
