//! PostgreSQL-backed notification storage.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::notifications::Notification;
use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewNotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the [`NotificationRepository`] port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewNotificationRow::from(notification);
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert notification"))?;
        Ok(())
    }
}
