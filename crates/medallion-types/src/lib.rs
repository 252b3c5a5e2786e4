//! Shared types for the medallion pipeline.
//!
//! Everything here is plain data: table identities, raw bronze rows,
//! cleaned silver records, audit records, and gold result sets. Both the
//! store crate and the engine crate depend on these without depending on
//! each other.

#![warn(clippy::pedantic)]

pub mod audit;
pub mod gold;
pub mod numeric;
pub mod raw;
pub mod record;
pub mod table;

pub use audit::{AuditRecord, Reason};
pub use gold::{GoldColumn, GoldResult};
pub use numeric::Numeric;
pub use raw::{RawRow, RawTable};
pub use record::{
    Assessment, Course, Enrollment, EnrollmentStatus, Payment, PaymentMethod, SilverLayer,
    SilverRecord, Student,
};
pub use table::TableName;
