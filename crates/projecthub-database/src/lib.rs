//! # projecthub-database
//!
//! The record store and access-control seams, with a PostgreSQL
//! implementation backed by `sqlx` and an in-process implementation used
//! by tests and the `memory` store provider.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryRecordStore;
pub use repositories::{PgAccessControl, PgRecordStore};
pub use store::{AccessControl, NodeQuery, RecordStore};
