//! # projecthub-core
//!
//! Core crate for the ProjectHub workspace engine. Contains the seam traits
//! (record store, access control, cache, change notification), configuration
//! schemas, workspace path rules, domain change events, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other ProjectHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod path;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
