//! Server-to-client WebSocket frames.

use serde::Serialize;

use crate::domain::notifications::Notification;

/// JSON frame pushed to a connected client, tagged by `event`.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerFrame<'a> {
    /// Sent once after the upgrade succeeds.
    Connected {
        user_id: &'a str,
        connection_id: uuid::Uuid,
    },
    /// A newly persisted notification.
    Notification { notification: &'a Notification },
}
