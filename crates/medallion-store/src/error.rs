//! Store error types.

/// Operational failures raised by a store. Data-quality problems are
/// never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not establish a connection.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// A statement failed; `context` names the operation.
    #[error("{context}: {source}")]
    Postgres {
        context: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// An identifier from configuration cannot be used in DDL.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// A gold result row does not match its column list.
    #[error("gold result '{table}' row {row} has {found} values, expected {expected}")]
    ShapeMismatch {
        table: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Failure raised on purpose by [`MemoryWarehouse`](crate::MemoryWarehouse).
    #[error("simulated store failure: {0}")]
    Simulated(String),
}

impl StoreError {
    pub(crate) fn postgres(context: impl Into<String>, source: tokio_postgres::Error) -> Self {
        Self::Postgres {
            context: context.into(),
            source,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, StoreError>;
