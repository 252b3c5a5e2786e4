//! Warehouse storage for the medallion pipeline.
//!
//! Provides the store traits the engine is written against
//! ([`RawSource`], [`BronzeSink`], [`SilverSink`], [`GoldSource`],
//! [`GoldTarget`]), a [`PgWarehouse`] implementation over `tokio-postgres`,
//! and a [`MemoryWarehouse`] for tests.

#![warn(clippy::pedantic)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use backend::{BronzeSink, GoldSource, GoldTarget, PublishStats, RawSource, SilverSink};
pub use error::StoreError;
pub use memory::MemoryWarehouse;
pub use postgres::{ConnectionParams, PgWarehouse};
