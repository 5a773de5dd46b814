//! Domain events emitted by workspace operations.
//!
//! Events are produced by the service layer once a mutation is durable and
//! consumed by the presence hub, which forwards them to connected clients.

pub mod file;

pub use file::{FileChangeEvent, FileChangeKind};
