//! Tree listing: pure builder, generation-keyed cache, and the service
//! that ties them to the record store.

pub mod builder;
pub mod cache;
pub mod options;
pub mod service;

pub use builder::TreeBuilder;
pub use cache::TreeCache;
pub use options::{SystemFileFilter, TreeOptions};
pub use service::TreeService;
