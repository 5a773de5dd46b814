//! Core traits defined in `projecthub-core` and implemented by other crates.

pub mod cache;
pub mod notifier;

pub use cache::CacheProvider;
pub use notifier::{ChangeNotifier, NoopNotifier};
