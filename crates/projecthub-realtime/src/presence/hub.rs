//! Presence hub: one room per workspace.
//!
//! Each room is mutated only while its map entry is locked, which gives
//! per-workspace mutual exclusion for presence updates. Outbound messages
//! are collected under the lock and sent after it is released; sends never
//! block, so a slow client cannot stall a room.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use projecthub_core::config::RealtimeConfig;
use projecthub_core::events::FileChangeEvent;
use projecthub_core::path;
use projecthub_core::traits::ChangeNotifier;
use projecthub_entity::presence::PresenceRecord;

use crate::connection::authorizer::AuthorizedMember;
use crate::connection::handle::ConnectionHandle;
use crate::message::types::{InboundMessage, OutboundMessage};

use super::room::{Delivery, Room};

/// Tracks every joined connection and fans messages out per workspace.
#[derive(Debug)]
pub struct PresenceHub {
    rooms: DashMap<Uuid, Room>,
    config: RealtimeConfig,
}

impl PresenceHub {
    /// Creates an empty hub.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            config,
        }
    }

    /// Register a connection in the member's workspace room.
    ///
    /// The user's first connection creates their presence record and is
    /// announced to the room. Every new connection receives the current
    /// active-user list. A user at the connection cap loses their oldest
    /// connection.
    pub fn join(
        &self,
        member: AuthorizedMember,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let workspace_id = member.workspace_id();
        let identity = member.identity();
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(
            workspace_id,
            identity.user_id,
            identity.user_name.clone(),
            identity.user_email.clone(),
            tx,
        ));

        let cap = self.config.max_connections_per_user.max(1);
        let mut evicted = Vec::new();
        let mut deliveries = Vec::new();
        {
            let mut room = self.rooms.entry(workspace_id).or_default();
            while room.connection_count_for(identity.user_id) >= cap {
                match room.take_oldest_of(identity.user_id) {
                    Some(oldest) => evicted.push(oldest),
                    None => break,
                }
            }

            room.add(handle.clone());
            if !room.presence.contains_key(&identity.user_id) {
                let record = PresenceRecord::new(
                    identity.user_id,
                    identity.user_name.clone(),
                    identity.user_email.clone(),
                );
                room.presence.insert(identity.user_id, record.clone());
                deliveries.push(Delivery::new(
                    room.everyone_except(handle.id),
                    OutboundMessage::UserJoined { user: record },
                ));
            }
            deliveries.push(Delivery::new(
                vec![handle.clone()],
                OutboundMessage::ActiveUsers {
                    users: room.active_users(Utc::now(), self.config.presence_ttl()),
                },
            ));
        }

        for oldest in evicted {
            warn!(
                conn_id = %oldest.id,
                user_id = %oldest.user_id,
                max = cap,
                "User at max connections, closing oldest"
            );
            oldest.close();
        }
        for delivery in deliveries {
            delivery.dispatch();
        }

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            workspace_id = %workspace_id,
            "Presence connection joined"
        );
        (handle, rx)
    }

    /// Remove a connection. The user's last connection takes the presence
    /// record with it and is announced as `user_left`.
    pub fn leave(&self, handle: &ConnectionHandle) {
        handle.close();
        let workspace_id = handle.workspace_id;

        let delivery = {
            let Some(mut room) = self.rooms.get_mut(&workspace_id) else {
                return;
            };
            if room.remove(handle.id).is_none() {
                return;
            }
            if room.connection_count_for(handle.user_id) > 0 {
                None
            } else {
                room.presence.remove(&handle.user_id).map(|record| {
                    Delivery::new(
                        room.everyone(),
                        OutboundMessage::UserLeft {
                            user_id: record.user_id,
                            user_name: record.user_name,
                        },
                    )
                })
            }
        };
        self.rooms.remove_if(&workspace_id, |_, room| room.is_empty());

        if let Some(delivery) = delivery {
            delivery.dispatch();
        }
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            workspace_id = %workspace_id,
            "Presence connection left"
        );
    }

    /// Parse and apply a raw client frame. Malformed frames are answered
    /// with an error message to the sender only.
    pub fn handle_text(&self, handle: &ConnectionHandle, raw: &str) {
        match serde_json::from_str::<InboundMessage>(raw) {
            Ok(msg) => self.handle_inbound(handle, msg),
            Err(e) => {
                handle.send(OutboundMessage::Error {
                    code: "INVALID_MESSAGE".to_string(),
                    message: format!("Failed to parse message: {e}"),
                });
            }
        }
    }

    /// Apply a client event to the sender's presence record and relay the
    /// result to the rest of the room.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, msg: InboundMessage) {
        let msg = match normalize_paths(msg) {
            Ok(msg) => msg,
            Err(message) => {
                handle.send(OutboundMessage::Error {
                    code: "BAD_REQUEST".to_string(),
                    message,
                });
                return;
            }
        };

        let now = Utc::now();
        let delivery = {
            let Some(mut room) = self.rooms.get_mut(&handle.workspace_id) else {
                return;
            };
            if !room.contains(handle.id) {
                debug!(conn_id = %handle.id, "Message from connection no longer in room");
                return;
            }
            let others = room.everyone_except(handle.id);
            let Some(record) = room.presence.get_mut(&handle.user_id) else {
                return;
            };

            let message = match msg {
                InboundMessage::FileOpened { path } => {
                    record.open_file(path, now);
                    Some(OutboundMessage::PresenceUpdate {
                        user: record.clone(),
                    })
                }
                InboundMessage::CursorMoved { path, cursor } => {
                    record.move_cursor(path, cursor, now);
                    Some(OutboundMessage::PresenceUpdate {
                        user: record.clone(),
                    })
                }
                InboundMessage::FileClosed { path } => {
                    record
                        .close_file(&path, now)
                        .then(|| OutboundMessage::PresenceUpdate {
                            user: record.clone(),
                        })
                }
                InboundMessage::ContentChanged { path, summary } => {
                    record.touch(now);
                    Some(OutboundMessage::FileModified {
                        path,
                        user_id: record.user_id,
                        user_name: record.user_name.clone(),
                        summary,
                    })
                }
            };
            message.map(|message| Delivery::new(others, message))
        };

        if let Some(delivery) = delivery {
            delivery.dispatch();
        }
    }

    /// Users in a workspace with an open file and recent activity.
    pub fn active_users(&self, workspace_id: Uuid) -> Vec<PresenceRecord> {
        self.active_users_at(workspace_id, Utc::now())
    }

    /// [`active_users`](Self::active_users) evaluated at `now`.
    pub fn active_users_at(&self, workspace_id: Uuid, now: DateTime<Utc>) -> Vec<PresenceRecord> {
        self.rooms
            .get(&workspace_id)
            .map(|room| room.active_users(now, self.config.presence_ttl()))
            .unwrap_or_default()
    }

    /// Drop every connection whose client has gone away. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        let closed: Vec<Arc<ConnectionHandle>> = self
            .rooms
            .iter()
            .flat_map(|room| room.closed_connections())
            .collect();
        for handle in &closed {
            self.leave(handle);
        }
        closed.len()
    }

    /// Close every connection and forget all rooms.
    pub fn close_all(&self) {
        let mut count = 0;
        for mut room in self.rooms.iter_mut() {
            for conn in room.drain() {
                conn.close();
                count += 1;
            }
        }
        self.rooms.clear();
        info!(count, "All presence connections closed");
    }

    /// Total joined connections.
    pub fn connection_count(&self) -> usize {
        self.rooms.iter().map(|room| room.connection_count()).sum()
    }

    /// Number of workspaces with at least one connection.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl ChangeNotifier for PresenceHub {
    fn notify_file_changed(&self, workspace_id: Uuid, event: FileChangeEvent) {
        let recipients = match self.rooms.get(&workspace_id) {
            Some(room) => room.everyone(),
            None => return,
        };
        let kind = event.kind;
        let sent = Delivery::new(recipients, OutboundMessage::FileChanged { event }).dispatch();
        debug!(workspace_id = %workspace_id, kind = %kind, sent, "File change broadcast");
    }
}

fn normalize_paths(msg: InboundMessage) -> Result<InboundMessage, String> {
    let clean = |raw: String| path::normalize_path(&raw).map_err(|e| e.message);
    Ok(match msg {
        InboundMessage::FileOpened { path } => InboundMessage::FileOpened { path: clean(path)? },
        InboundMessage::FileClosed { path } => InboundMessage::FileClosed { path: clean(path)? },
        InboundMessage::CursorMoved { path, cursor } => InboundMessage::CursorMoved {
            path: path.map(clean).transpose()?,
            cursor,
        },
        InboundMessage::ContentChanged { path, summary } => InboundMessage::ContentChanged {
            path: clean(path)?,
            summary,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::authorizer::{MemberIdentity, admit};
    use chrono::Duration;
    use projecthub_core::events::FileChangeKind;
    use projecthub_entity::presence::CursorPosition;

    fn hub() -> PresenceHub {
        PresenceHub::new(RealtimeConfig::default())
    }

    fn member(ws: Uuid, user_id: Uuid, name: &str) -> AuthorizedMember {
        admit(
            ws,
            MemberIdentity {
                user_id,
                user_name: name.to_string(),
                user_email: format!("{name}@example.com"),
            },
        )
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn open(path: &str) -> InboundMessage {
        InboundMessage::FileOpened {
            path: path.to_string(),
        }
    }

    #[tokio::test]
    async fn test_join_announces_first_connection_only() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let (ann, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let (_a, mut rx_a) = hub.join(member(ws, ann, "ann"));
        assert_eq!(
            drain(&mut rx_a),
            vec![OutboundMessage::ActiveUsers { users: vec![] }]
        );

        let (_b1, mut rx_b1) = hub.join(member(ws, bob, "bob"));
        let seen = drain(&mut rx_a);
        assert!(matches!(&seen[..], [OutboundMessage::UserJoined { user }] if user.user_id == bob));
        assert!(matches!(drain(&mut rx_b1)[..], [OutboundMessage::ActiveUsers { .. }]));

        let (_b2, _rx_b2) = hub.join(member(ws, bob, "bob"));
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(hub.connection_count(), 3);
    }

    #[tokio::test]
    async fn test_open_file_appears_in_active_users_until_stale() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let ann = Uuid::new_v4();
        let (a, _rx_a) = hub.join(member(ws, ann, "ann"));

        hub.handle_inbound(&a, open("/src/main.rs"));
        let active = hub.active_users(ws);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].file_path, "src/main.rs");

        let later = Utc::now() + Duration::minutes(5) + Duration::seconds(5);
        assert!(hub.active_users_at(ws, later).is_empty());
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_updates_skip_the_sender() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let (a, mut rx_a) = hub.join(member(ws, Uuid::new_v4(), "ann"));
        let (_b, mut rx_b) = hub.join(member(ws, Uuid::new_v4(), "bob"));
        drain(&mut rx_a);
        drain(&mut rx_b);

        hub.handle_inbound(
            &a,
            InboundMessage::CursorMoved {
                path: Some("a.txt".into()),
                cursor: CursorPosition {
                    line: 4,
                    column: 2,
                    selection: None,
                },
            },
        );
        assert!(drain(&mut rx_a).is_empty());
        let seen = drain(&mut rx_b);
        assert!(matches!(
            &seen[..],
            [OutboundMessage::PresenceUpdate { user }] if user.file_path == "a.txt" && user.cursor.is_some()
        ));

        hub.handle_inbound(
            &a,
            InboundMessage::ContentChanged {
                path: "a.txt".into(),
                summary: Some("typing".into()),
            },
        );
        assert!(matches!(
            &drain(&mut rx_b)[..],
            [OutboundMessage::FileModified { path, .. }] if path == "a.txt"
        ));
    }

    #[tokio::test]
    async fn test_close_of_other_file_keeps_current_one() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let ann = Uuid::new_v4();
        let (tab1, _rx1) = hub.join(member(ws, ann, "ann"));
        let (tab2, _rx2) = hub.join(member(ws, ann, "ann"));

        hub.handle_inbound(&tab1, open("a.txt"));
        hub.handle_inbound(&tab2, open("b.txt"));
        hub.handle_inbound(
            &tab1,
            InboundMessage::FileClosed {
                path: "a.txt".into(),
            },
        );

        let active = hub.active_users(ws);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].file_path, "b.txt");
    }

    #[tokio::test]
    async fn test_last_connection_leaving_announces_user_left() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (_a, mut rx_a) = hub.join(member(ws, Uuid::new_v4(), "ann"));
        let (b1, _rx_b1) = hub.join(member(ws, bob, "bob"));
        let (b2, _rx_b2) = hub.join(member(ws, bob, "bob"));
        drain(&mut rx_a);

        hub.leave(&b1);
        assert!(drain(&mut rx_a).is_empty());

        hub.leave(&b2);
        assert_eq!(
            drain(&mut rx_a),
            vec![OutboundMessage::UserLeft {
                user_id: bob,
                user_name: "bob".into()
            }]
        );
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_room_is_dropped() {
        let hub = hub();
        let (a, _rx) = hub.join(member(Uuid::new_v4(), Uuid::new_v4(), "ann"));
        assert_eq!(hub.room_count(), 1);
        hub.leave(&a);
        hub.leave(&a);
        assert_eq!(hub.room_count(), 0);
    }

    #[tokio::test]
    async fn test_file_changes_reach_everyone() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let ann = Uuid::new_v4();
        let (_a, mut rx_a) = hub.join(member(ws, ann, "ann"));
        let (_b, mut rx_b) = hub.join(member(ws, Uuid::new_v4(), "bob"));
        let (_other, mut rx_other) = hub.join(member(Uuid::new_v4(), ann, "ann"));
        drain(&mut rx_a);
        drain(&mut rx_b);
        drain(&mut rx_other);

        hub.notify_file_changed(
            ws,
            FileChangeEvent::new(FileChangeKind::Created, "new.txt", ann),
        );
        for rx in [&mut rx_a, &mut rx_b] {
            assert!(matches!(
                &drain(rx)[..],
                [OutboundMessage::FileChanged { event }] if event.path == "new.txt"
            ));
        }
        assert!(drain(&mut rx_other).is_empty());
    }

    #[tokio::test]
    async fn test_connection_cap_evicts_oldest() {
        let hub = PresenceHub::new(RealtimeConfig {
            max_connections_per_user: 2,
            ..RealtimeConfig::default()
        });
        let ws = Uuid::new_v4();
        let ann = Uuid::new_v4();
        let (first, _rx1) = hub.join(member(ws, ann, "ann"));
        let (second, _rx2) = hub.join(member(ws, ann, "ann"));
        let (third, _rx3) = hub.join(member(ws, ann, "ann"));

        assert!(first.is_closed());
        assert!(!second.is_closed());
        assert!(!third.is_closed());
        assert_eq!(hub.connection_count(), 2);

        hub.handle_inbound(&first, open("ignored.txt"));
        assert!(hub.active_users(ws).is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_dropped_clients() {
        let hub = hub();
        let ws = Uuid::new_v4();
        let (_a, mut rx_a) = hub.join(member(ws, Uuid::new_v4(), "ann"));
        let (_b, rx_b) = hub.join(member(ws, Uuid::new_v4(), "bob"));
        drain(&mut rx_a);

        drop(rx_b);
        assert_eq!(hub.sweep(), 1);
        assert!(matches!(&drain(&mut rx_a)[..], [OutboundMessage::UserLeft { .. }]));
        assert_eq!(hub.sweep(), 0);
    }

    #[tokio::test]
    async fn test_malformed_frames_get_an_error() {
        let hub = hub();
        let (a, mut rx) = hub.join(member(Uuid::new_v4(), Uuid::new_v4(), "ann"));
        drain(&mut rx);

        hub.handle_text(&a, "{not json");
        hub.handle_text(&a, r#"{"type":"file_opened","path":"../etc"}"#);
        let errors: Vec<_> = drain(&mut rx)
            .into_iter()
            .map(|msg| match msg {
                OutboundMessage::Error { code, .. } => code,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(errors, vec!["INVALID_MESSAGE", "BAD_REQUEST"]);
    }
}
