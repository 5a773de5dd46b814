//! Connection handles and the join-time authorization gate.

pub mod authorizer;
pub mod handle;
