//! # projecthub-api
//!
//! HTTP API layer for ProjectHub built on Axum.
//!
//! Provides the workspace REST endpoints, the presence WebSocket upgrade,
//! caller-identity extraction, DTO normalization, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
