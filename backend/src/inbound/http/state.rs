//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so they can be tested without storage or sockets.

use std::sync::Arc;

use crate::domain::ports::{
    DeltaSyncQuery, FixtureDeltaSyncQuery, FixtureNotificationCommand, NotificationCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub delta_sync: Arc<dyn DeltaSyncQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
}

impl HttpState {
    pub fn new(
        delta_sync: Arc<dyn DeltaSyncQuery>,
        notifications: Arc<dyn NotificationCommand>,
    ) -> Self {
        Self {
            delta_sync,
            notifications,
        }
    }

    /// State backed by fixture ports that report no data.
    pub fn fixture() -> Self {
        Self::new(
            Arc::new(FixtureDeltaSyncQuery),
            Arc::new(FixtureNotificationCommand),
        )
    }
}
