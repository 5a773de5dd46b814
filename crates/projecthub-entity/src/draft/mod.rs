//! Draft domain entities.

pub mod model;

pub use model::Draft;
