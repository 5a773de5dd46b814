//! Workspace rooms, presence state, and the stale-connection sweeper.

pub mod hub;
pub mod room;
pub mod sweeper;

pub use hub::PresenceHub;
pub use sweeper::spawn_sweeper;
