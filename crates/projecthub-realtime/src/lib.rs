//! # projecthub-realtime
//!
//! Presence hub for ProjectHub workspaces. Provides:
//!
//! - One room per workspace holding every live connection
//! - Presence records (open file, cursor, last activity) per user
//! - Fan-out of durable file changes to every connection in a room
//! - A sweeper that drops connections whose client has gone away

pub mod connection;
pub mod message;
pub mod presence;

pub use connection::authorizer::{AuthorizedMember, MemberIdentity, WorkspaceAuthorizer};
pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use message::types::{InboundMessage, OutboundMessage};
pub use presence::hub::PresenceHub;
pub use presence::sweeper::spawn_sweeper;
