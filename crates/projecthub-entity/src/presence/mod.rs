//! Presence value objects.

pub mod model;

pub use model::{CursorPosition, PresenceRecord, SelectionRange};
