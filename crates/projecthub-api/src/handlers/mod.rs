//! Route handlers organized by domain.

pub mod content;
pub mod draft;
pub mod file;
pub mod health;
pub mod history;
pub mod presence;
pub mod tree;
pub mod ws;
