//! Per-connection notification socket loop.
//!
//! The server pings every 5s and drops a connection after 10s without client
//! traffic. Client text frames only count as traffic; notifications flow
//! server to client through [`WsConnectionRegistry`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use super::messages::ServerFrame;
use super::registry::WsConnectionRegistry;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(1);

enum SessionEnd {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

impl SessionEnd {
    fn log(&self, user_id: &str) {
        match self {
            Self::HeartbeatTimeout => warn!(user_id, "websocket heartbeat timeout"),
            Self::Protocol(error) => warn!(user_id, error = %error, "websocket protocol error"),
            Self::Network(error) => warn!(user_id, error = %error, "websocket send failed"),
            Self::ClientClosed(_) | Self::StreamClosed => {
                debug!(user_id, "websocket closed by client");
            }
        }
    }

    /// Close frame to send, if the socket is still writable.
    fn close_reason(self) -> Option<Option<CloseReason>> {
        match self {
            Self::HeartbeatTimeout => Some(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            Self::Protocol(_) => Some(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            Self::ClientClosed(reason) => Some(reason),
            Self::StreamClosed | Self::Network(_) => None,
        }
    }
}

/// Register the session, run it until it ends, then unregister it.
pub(super) async fn run_notification_session(
    registry: Arc<WsConnectionRegistry>,
    user_id: String,
    mut session: Session,
    stream: MessageStream,
) {
    let connection_id = registry.register(&user_id, session.clone());
    let greeting = ServerFrame::Connected {
        user_id: &user_id,
        connection_id,
    };
    let end = match send_json(&mut session, &greeting).await {
        Ok(()) => drive(&mut session, stream).await,
        Err(closed) => SessionEnd::Network(closed),
    };
    registry.unregister(&user_id, connection_id);

    end.log(&user_id);
    if let Some(reason) = end.close_reason() {
        if let Err(error) = session.close(reason).await {
            debug!(user_id, error = %error, "websocket already closed");
        }
    }
}

async fn drive(session: &mut Session, mut stream: MessageStream) -> SessionEnd {
    let mut last_seen = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    loop {
        let step = tokio::select! {
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    Err(SessionEnd::HeartbeatTimeout)
                } else {
                    session.ping(b"").await.map_err(SessionEnd::Network)
                }
            }
            message = stream.recv() => handle_message(session, &mut last_seen, message).await,
        };
        if let Err(end) = step {
            return end;
        }
    }
}

async fn handle_message(
    session: &mut Session,
    last_seen: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionEnd> {
    let message = match message {
        None => return Err(SessionEnd::StreamClosed),
        Some(Err(error)) => return Err(SessionEnd::Protocol(error)),
        Some(Ok(message)) => message,
    };
    *last_seen = Instant::now();
    match message {
        Message::Ping(payload) => session.pong(&payload).await.map_err(SessionEnd::Network),
        Message::Close(reason) => Err(SessionEnd::ClientClosed(reason)),
        Message::Text(_)
        | Message::Pong(_)
        | Message::Binary(_)
        | Message::Continuation(_)
        | Message::Nop => Ok(()),
    }
}

async fn send_json(session: &mut Session, frame: &ServerFrame<'_>) -> Result<(), Closed> {
    match serde_json::to_string(frame) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "failed to encode websocket frame");
            Ok(())
        }
    }
}
