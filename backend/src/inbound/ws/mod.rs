//! WebSocket inbound adapter for live notification delivery.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, recipient id)
//! - register each socket with the [`registry::WsConnectionRegistry`]
//! - run the heartbeat loop until the client goes away

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use serde::Deserialize;
use tracing::{error, warn};
use url::Url;

mod session;

pub mod messages;
pub mod registry;
pub mod state;

/// Origins allowed to open sockets.
///
/// Accepts HTTPS from the primary host and its subdomains, and HTTP from
/// localhost with a non-zero explicit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAllowList {
    primary_host: String,
}

impl OriginAllowList {
    pub fn new(primary_host: impl Into<String>) -> Self {
        Self {
            primary_host: primary_host.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        match origin.scheme() {
            "http" if host == "localhost" => matches!(origin.port(), Some(port) if port != 0),
            "https" if host == self.primary_host => true,
            "https" => host
                .strip_suffix(self.primary_host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1),
            _ => false,
        }
    }

    fn validate(&self, header: &HeaderValue) -> actix_web::Result<()> {
        let value = header.to_str().map_err(|error| {
            error!(error = %error, "Origin header is not valid UTF-8");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;
        let origin = Url::parse(value).map_err(|error| {
            error!(error = %error, "Origin header is not a URL");
            actix_web::error::ErrorBadRequest("Invalid Origin header")
        })?;
        if self.allows(&origin) {
            Ok(())
        } else {
            warn!(origin = value, "rejected websocket upgrade from disallowed origin");
            Err(actix_web::error::ErrorForbidden("Origin not allowed"))
        }
    }
}

/// Query string of the socket endpoint.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
}

/// Upgrade to a notification socket for `user_id`.
#[get("/ws/notifications")]
pub async fn notifications_socket(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    query: web::Query<ConnectQuery>,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origins = req.headers().get_all(ORIGIN);
    let origin = origins.next().ok_or_else(|| {
        error!("missing Origin header on websocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origins.next().is_some() {
        error!("multiple Origin headers on websocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    state.origins.validate(origin)?;

    let user_id = query.into_inner().user_id.trim().to_owned();
    if user_id.is_empty() {
        return Err(actix_web::error::ErrorBadRequest("user_id is required"));
    }

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "websocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    actix_web::rt::spawn(session::run_notification_session(
        state.registry.clone(),
        user_id,
        session,
        messages,
    ));
    Ok(response)
}
