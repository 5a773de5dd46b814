//! # projecthub-service
//!
//! Business logic for the ProjectHub workspace engine. Each service holds
//! its collaborators behind `Arc` handles injected at construction time.
//!
//! Every mutation follows the same order: durable write, version append,
//! generation bump, draft cleanup, change notification.

pub mod access;
pub mod context;
pub mod draft;
pub mod file;
pub mod generation;
pub mod tree;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use access::AccessGuard;
pub use context::RequestContext;
pub use draft::DraftService;
pub use file::FileService;
pub use generation::GenerationCounter;
pub use tree::{TreeCache, TreeOptions, TreeService};
pub use version::VersionService;
