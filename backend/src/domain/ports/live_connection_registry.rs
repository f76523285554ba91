//! Port for pushing notifications to connected clients.

use async_trait::async_trait;

use crate::domain::notifications::{DeliveryOutcome, Notification};

/// Registry of live client connections keyed by recipient id.
///
/// Pushing is best effort: implementations report what happened instead of
/// failing, because the notification has already been persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveConnectionRegistry: Send + Sync {
    /// Push `notification` to every live session of `recipient_id`.
    async fn send(&self, recipient_id: &str, notification: &Notification) -> DeliveryOutcome;
}

/// Fixture registry with no live connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLiveConnectionRegistry;

#[async_trait]
impl LiveConnectionRegistry for FixtureLiveConnectionRegistry {
    async fn send(&self, _recipient_id: &str, _notification: &Notification) -> DeliveryOutcome {
        DeliveryOutcome::Queued
    }
}
