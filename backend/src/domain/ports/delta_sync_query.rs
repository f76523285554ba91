//! Driving port for delta sync reads.
//!
//! Inbound adapters pass raw client parameters through this port; parsing of
//! the checkpoint and resolution of table names happen in the domain.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::sync::EntityKind;
use crate::domain::{Error, SyncItem};

/// Request for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDeltaRequest {
    pub kind: EntityKind,
    /// Client checkpoint as sent; unparseable values mean full sync.
    pub last_sync: Option<String>,
    pub limit: Option<usize>,
    /// Owning user for user-scoped collections.
    pub owner: Option<String>,
}

impl EntityDeltaRequest {
    /// Full, unscoped request for `kind`.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            last_sync: None,
            limit: None,
            owner: None,
        }
    }
}

/// Changes for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityChanges {
    pub items: Vec<SyncItem>,
    pub deleted_ids: Vec<String>,
    /// More changed records exist beyond `items`.
    pub has_more: bool,
}

impl EntityChanges {
    /// Number of returned items.
    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// Response for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDelta {
    pub kind: EntityKind,
    pub changes: EntityChanges,
    /// Checkpoint the client should send next time.
    pub server_time: DateTime<Utc>,
    /// Whether a valid checkpoint was applied.
    pub is_delta: bool,
}

/// Request spanning several entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedDeltaRequest {
    pub last_sync: Option<String>,
    /// Comma-separated table names; absent or empty means the default set.
    pub tables: Option<String>,
    pub limit: Option<usize>,
    /// Owning user, applied to user-scoped types such as orders.
    pub owner: Option<String>,
}

/// Response spanning several entity types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedDelta {
    pub server_time: DateTime<Utc>,
    pub is_delta: bool,
    pub data: BTreeMap<EntityKind, EntityChanges>,
    /// Types whose pass failed; clients keep their old checkpoint for them.
    pub failed_tables: Vec<EntityKind>,
}

/// Driving port for delta sync.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), catalog_backend::domain::Error> {
/// use catalog_backend::domain::ports::{DeltaSyncQuery, EntityDeltaRequest, FixtureDeltaSyncQuery};
/// use catalog_backend::domain::sync::EntityKind;
///
/// let delta = FixtureDeltaSyncQuery
///     .entity_delta(EntityDeltaRequest::new(EntityKind::Categories))
///     .await?;
/// assert!(!delta.is_delta);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeltaSyncQuery: Send + Sync {
    /// Changes and deletions for a single entity type.
    async fn entity_delta(&self, request: EntityDeltaRequest) -> Result<EntityDelta, Error>;

    /// Changes and deletions for several entity types in one response.
    async fn combined_delta(&self, request: CombinedDeltaRequest) -> Result<CombinedDelta, Error>;
}

/// Fixture query that reports no changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDeltaSyncQuery;

#[async_trait]
impl DeltaSyncQuery for FixtureDeltaSyncQuery {
    async fn entity_delta(&self, request: EntityDeltaRequest) -> Result<EntityDelta, Error> {
        Ok(EntityDelta {
            kind: request.kind,
            changes: EntityChanges {
                items: Vec::new(),
                deleted_ids: Vec::new(),
                has_more: false,
            },
            server_time: DateTime::<Utc>::UNIX_EPOCH,
            is_delta: false,
        })
    }

    async fn combined_delta(&self, _request: CombinedDeltaRequest) -> Result<CombinedDelta, Error> {
        Ok(CombinedDelta {
            server_time: DateTime::<Utc>::UNIX_EPOCH,
            is_delta: false,
            data: BTreeMap::new(),
            failed_tables: Vec::new(),
        })
    }
}
