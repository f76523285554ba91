//! Port for reading change sets and tombstones from the document store.
//!
//! Adapters apply the filters described by [`RecordQuery`] and
//! [`TombstoneQuery`] on the store side; the sync core only trims, enriches,
//! and assembles the results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::sync::{EntityKind, SortOrder};
use crate::domain::{CarBrand, CarModel, ProductBrand, StoredRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by sync repository adapters.
    pub enum SyncRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "sync repository connection failed: {message}",
        /// A query failed while executing.
        Query { message: String } =>
            "sync repository query failed: {message}",
    }
}

/// Selection of live records changed after an optional instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub kind: EntityKind,
    /// Only records with `updated_at` strictly after this instant.
    pub updated_after: Option<DateTime<Utc>>,
    /// Only records owned by this user (user-scoped collections).
    pub owner: Option<String>,
    pub sort: SortOrder,
    /// Maximum number of records to return.
    pub limit: usize,
}

/// Selection of soft-deleted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TombstoneQuery {
    pub kind: EntityKind,
    /// Only records with `deleted_at` strictly after this instant.
    pub deleted_after: DateTime<Utc>,
    pub owner: Option<String>,
    pub limit: usize,
}

/// Identifier and deletion time of a soft-deleted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    pub id: String,
    pub deleted_at: DateTime<Utc>,
}

/// Read access to synced collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncRepository: Send + Sync {
    /// Live (`deleted_at IS NULL`) records matching `query`, ordered by
    /// `query.sort` with ties broken by ascending id.
    async fn changed_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<StoredRecord>, SyncRepositoryError>;

    /// Records deleted after `query.deleted_after`, oldest deletion first.
    async fn tombstones(
        &self,
        query: &TombstoneQuery,
    ) -> Result<Vec<Tombstone>, SyncRepositoryError>;

    /// Product brands with the given ids, regardless of deletion state.
    async fn product_brands_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<ProductBrand>, SyncRepositoryError>;

    /// Car models with the given ids, regardless of deletion state.
    async fn car_models_by_ids(&self, ids: &[String])
    -> Result<Vec<CarModel>, SyncRepositoryError>;

    /// Car brands with the given ids, regardless of deletion state.
    async fn car_brands_by_ids(&self, ids: &[String])
    -> Result<Vec<CarBrand>, SyncRepositoryError>;
}

/// Fixture repository holding no records.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSyncRepository;

#[async_trait]
impl SyncRepository for FixtureSyncRepository {
    async fn changed_records(
        &self,
        _query: &RecordQuery,
    ) -> Result<Vec<StoredRecord>, SyncRepositoryError> {
        Ok(Vec::new())
    }

    async fn tombstones(
        &self,
        _query: &TombstoneQuery,
    ) -> Result<Vec<Tombstone>, SyncRepositoryError> {
        Ok(Vec::new())
    }

    async fn product_brands_by_ids(
        &self,
        _ids: &[String],
    ) -> Result<Vec<ProductBrand>, SyncRepositoryError> {
        Ok(Vec::new())
    }

    async fn car_models_by_ids(
        &self,
        _ids: &[String],
    ) -> Result<Vec<CarModel>, SyncRepositoryError> {
        Ok(Vec::new())
    }

    async fn car_brands_by_ids(
        &self,
        _ids: &[String],
    ) -> Result<Vec<CarBrand>, SyncRepositoryError> {
        Ok(Vec::new())
    }
}
