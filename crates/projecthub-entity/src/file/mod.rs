//! File and directory entities.

pub mod kind;
pub mod mime;
pub mod model;
pub mod version;

pub use kind::{FilePermission, NodeKind};
pub use mime::mime_type_for;
pub use model::{FileNode, stored_now};
pub use version::FileVersion;
