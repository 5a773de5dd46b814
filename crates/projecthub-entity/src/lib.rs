//! # projecthub-entity
//!
//! Domain entity models for ProjectHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod draft;
pub mod file;
pub mod presence;
pub mod tree;
pub mod workspace;
