//! Per-author scratch drafts.

pub mod service;

pub use service::DraftService;
