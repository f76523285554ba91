//! Live WebSocket sessions keyed by recipient id.
//!
//! The map lock is held only to read or update the map; sessions are cloned
//! out before any frame is sent.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_ws::Session;
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::notifications::{DeliveryOutcome, Notification};
use crate::domain::ports::LiveConnectionRegistry;

use super::messages::ServerFrame;

type Sessions = HashMap<String, Vec<(Uuid, Session)>>;

/// Registry of open notification sockets.
#[derive(Default)]
pub struct WsConnectionRegistry {
    sessions: Mutex<Sessions>,
}

impl WsConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track a new session for `user_id` and return its connection id.
    pub fn register(&self, user_id: &str, session: Session) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.lock()
            .entry(user_id.to_owned())
            .or_default()
            .push((connection_id, session));
        debug!(user_id, %connection_id, "websocket session registered");
        connection_id
    }

    /// Forget a session. Users with no remaining sessions are removed.
    pub fn unregister(&self, user_id: &str, connection_id: Uuid) {
        let mut sessions = self.lock();
        if let Some(entries) = sessions.get_mut(user_id) {
            entries.retain(|(id, _)| *id != connection_id);
            if entries.is_empty() {
                sessions.remove(user_id);
            }
        }
        debug!(user_id, %connection_id, "websocket session unregistered");
    }

    /// Number of open sessions for `user_id`.
    pub fn connection_count(&self, user_id: &str) -> usize {
        self.lock().get(user_id).map_or(0, Vec::len)
    }

    fn sessions_for(&self, user_id: &str) -> Vec<(Uuid, Session)> {
        self.lock().get(user_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LiveConnectionRegistry for WsConnectionRegistry {
    async fn send(&self, recipient_id: &str, notification: &Notification) -> DeliveryOutcome {
        let sessions = self.sessions_for(recipient_id);
        if sessions.is_empty() {
            return DeliveryOutcome::Queued;
        }

        let frame = match serde_json::to_string(&ServerFrame::Notification { notification }) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, recipient_id, "failed to encode notification frame");
                return DeliveryOutcome::Dropped;
            }
        };

        let mut delivered = false;
        for (connection_id, mut session) in sessions {
            if session.text(frame.clone()).await.is_ok() {
                delivered = true;
            } else {
                self.unregister(recipient_id, connection_id);
            }
        }

        // Every session had already closed; the stored record is fetched later.
        if delivered {
            DeliveryOutcome::Delivered
        } else {
            DeliveryOutcome::Queued
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notifications::{NotificationCategory, NotificationSeverity};
    use chrono::{DateTime, Utc};
    use serde_json::Map;

    #[tokio::test]
    async fn recipients_without_sessions_are_queued() {
        let registry = WsConnectionRegistry::new();
        let notification = Notification {
            id: Uuid::nil(),
            user_id: "u1".to_owned(),
            title: "t".to_owned(),
            message: "m".to_owned(),
            severity: NotificationSeverity::Info,
            category: NotificationCategory::Order,
            read: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            extra: Map::new(),
        };
        assert_eq!(
            registry.send("u1", &notification).await,
            DeliveryOutcome::Queued
        );
        assert_eq!(registry.connection_count("u1"), 0);
    }

    #[test]
    fn unregistering_unknown_sessions_is_a_no_op() {
        let registry = WsConnectionRegistry::new();
        registry.unregister("nobody", Uuid::nil());
        assert_eq!(registry.connection_count("nobody"), 0);
    }
}
