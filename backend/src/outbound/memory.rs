//! In-process store implementing the sync and notification ports.
//!
//! Used when no database is configured and by integration tests. The store
//! applies the same filters and ordering the PostgreSQL adapters push into
//! SQL.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::notifications::{Notification, Recipient};
use crate::domain::ports::{
    NotificationRepository, NotificationRepositoryError, RecipientDirectory,
    RecipientDirectoryError, RecipientFilter, RecordQuery, SyncRepository, SyncRepositoryError,
    Tombstone, TombstoneQuery,
};
use crate::domain::sync::EntityKind;
use crate::domain::{CarBrand, CarModel, ProductBrand, StoredRecord};

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<(EntityKind, String), StoredRecord>,
    recipients: BTreeMap<String, Recipient>,
    notifications: Vec<Notification>,
}

/// Mutex-guarded catalogue, user, and notification store.
#[derive(Debug, Default)]
pub struct InMemoryCatalogueStore {
    state: Mutex<State>,
}

impl InMemoryCatalogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a record, keyed by type and id.
    pub fn upsert_record(&self, record: StoredRecord) {
        let key = (record.kind(), record.id().to_owned());
        self.lock().records.insert(key, record);
    }

    /// Insert or replace several records.
    pub fn upsert_records(&self, records: impl IntoIterator<Item = StoredRecord>) {
        let mut state = self.lock();
        for record in records {
            state
                .records
                .insert((record.kind(), record.id().to_owned()), record);
        }
    }

    /// Register an active user.
    pub fn add_recipient(&self, recipient: Recipient) {
        self.lock()
            .recipients
            .insert(recipient.id.clone(), recipient);
    }

    /// Remove a user so it no longer receives broadcasts.
    pub fn remove_recipient(&self, recipient_id: &str) -> Option<Recipient> {
        self.lock().recipients.remove(recipient_id)
    }

    /// Notifications persisted so far, in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    fn records_by_ids<T>(
        &self,
        kind: EntityKind,
        ids: &[String],
        pick: impl Fn(&StoredRecord) -> Option<T>,
    ) -> Vec<T> {
        let state = self.lock();
        ids.iter()
            .filter_map(|id| state.records.get(&(kind, id.clone())))
            .filter_map(pick)
            .collect()
    }
}

fn owned_by(record: &StoredRecord, owner: Option<&str>) -> bool {
    owner.is_none_or(|owner| record.owner() == Some(owner))
}

#[async_trait]
impl SyncRepository for InMemoryCatalogueStore {
    async fn changed_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<StoredRecord>, SyncRepositoryError> {
        let owner = query.owner.as_deref().filter(|_| query.kind.is_user_scoped());
        let mut records: Vec<StoredRecord> = self
            .lock()
            .records
            .values()
            .filter(|record| record.kind() == query.kind)
            .filter(|record| record.deleted_at().is_none())
            .filter(|record| {
                query
                    .updated_after
                    .is_none_or(|after| record.updated_at() > after)
            })
            .filter(|record| owned_by(record, owner))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.compare(b, query.sort));
        records.truncate(query.limit);
        Ok(records)
    }

    async fn tombstones(
        &self,
        query: &TombstoneQuery,
    ) -> Result<Vec<Tombstone>, SyncRepositoryError> {
        let owner = query.owner.as_deref().filter(|_| query.kind.is_user_scoped());
        let mut tombstones: Vec<Tombstone> = self
            .lock()
            .records
            .values()
            .filter(|record| record.kind() == query.kind)
            .filter(|record| owned_by(record, owner))
            .filter_map(|record| {
                record
                    .deleted_at()
                    .filter(|deleted_at| *deleted_at > query.deleted_after)
                    .map(|deleted_at| Tombstone {
                        id: record.id().to_owned(),
                        deleted_at,
                    })
            })
            .collect();
        tombstones.sort_by(|a, b| a.deleted_at.cmp(&b.deleted_at).then_with(|| a.id.cmp(&b.id)));
        tombstones.truncate(query.limit);
        Ok(tombstones)
    }

    async fn product_brands_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<ProductBrand>, SyncRepositoryError> {
        Ok(self.records_by_ids(EntityKind::ProductBrands, ids, |record| match record {
            StoredRecord::ProductBrand(brand) => Some(brand.clone()),
            _ => None,
        }))
    }

    async fn car_models_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<CarModel>, SyncRepositoryError> {
        Ok(self.records_by_ids(EntityKind::CarModels, ids, |record| match record {
            StoredRecord::CarModel(model) => Some(model.clone()),
            _ => None,
        }))
    }

    async fn car_brands_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<CarBrand>, SyncRepositoryError> {
        Ok(self.records_by_ids(EntityKind::CarBrands, ids, |record| match record {
            StoredRecord::CarBrand(brand) => Some(brand.clone()),
            _ => None,
        }))
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryCatalogueStore {
    async fn active_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        Ok(self
            .lock()
            .recipients
            .values()
            .filter(|recipient| filter.accepts(&recipient.role))
            .take(filter.limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryCatalogueStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }
}
