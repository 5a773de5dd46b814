//! State of a single workspace room.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use projecthub_entity::presence::PresenceRecord;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::OutboundMessage;

/// Connections and presence records of one workspace.
#[derive(Debug, Default)]
pub struct Room {
    /// Live connections, oldest first.
    connections: Vec<Arc<ConnectionHandle>>,
    /// One record per user with at least one connection.
    pub(crate) presence: HashMap<Uuid, PresenceRecord>,
}

impl Room {
    pub(crate) fn add(&mut self, handle: Arc<ConnectionHandle>) {
        self.connections.push(handle);
    }

    pub(crate) fn remove(&mut self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let idx = self.connections.iter().position(|c| c.id == conn_id)?;
        Some(self.connections.remove(idx))
    }

    pub(crate) fn contains(&self, conn_id: ConnectionId) -> bool {
        self.connections.iter().any(|c| c.id == conn_id)
    }

    pub(crate) fn connection_count_for(&self, user_id: Uuid) -> usize {
        self.connections.iter().filter(|c| c.user_id == user_id).count()
    }

    /// Remove and return the user's longest-lived connection.
    pub(crate) fn take_oldest_of(&mut self, user_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        let idx = self.connections.iter().position(|c| c.user_id == user_id)?;
        Some(self.connections.remove(idx))
    }

    pub(crate) fn everyone(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.clone()
    }

    pub(crate) fn everyone_except(&self, conn_id: ConnectionId) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|c| c.id != conn_id)
            .cloned()
            .collect()
    }

    pub(crate) fn closed_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|c| c.is_closed())
            .cloned()
            .collect()
    }

    pub(crate) fn drain(&mut self) -> Vec<Arc<ConnectionHandle>> {
        self.presence.clear();
        std::mem::take(&mut self.connections)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Records with an open file and activity within `ttl` of `now`, by name.
    pub fn active_users(&self, now: DateTime<Utc>, ttl: Duration) -> Vec<PresenceRecord> {
        let mut users: Vec<PresenceRecord> = self
            .presence
            .values()
            .filter(|record| record.is_active(now, ttl))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.user_name
                .cmp(&b.user_name)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        users
    }
}

/// A message and the connections it goes to. Built while the room is
/// locked, sent after the lock is released.
#[derive(Debug)]
pub(crate) struct Delivery {
    recipients: Vec<Arc<ConnectionHandle>>,
    message: OutboundMessage,
}

impl Delivery {
    pub(crate) fn new(recipients: Vec<Arc<ConnectionHandle>>, message: OutboundMessage) -> Self {
        Self {
            recipients,
            message,
        }
    }

    /// Returns how many connections accepted the message.
    pub(crate) fn dispatch(self) -> usize {
        let Self {
            recipients,
            message,
        } = self;
        recipients
            .iter()
            .filter(|conn| conn.send(message.clone()))
            .count()
    }
}
