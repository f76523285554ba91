//! Port for persisting notifications.

use async_trait::async_trait;

use crate::domain::notifications::Notification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// The insert failed while executing.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Append-only notification storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a new notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;
}

/// Fixture repository that accepts and discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn insert(&self, _notification: &Notification) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }
}
