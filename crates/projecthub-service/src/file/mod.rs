//! File content reads, saves, and structural mutations.

pub mod content;
pub mod service;

pub use content::{ContentRead, FileContent, LineRange};
pub use service::{FileService, SaveOutcome};
