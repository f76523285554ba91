//! Collection of soft-deleted ids since a checkpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::ports::{SyncRepository, SyncRepositoryError, Tombstone, TombstoneQuery};

use super::checkpoint::SyncCheckpoint;
use super::entity::EntityKind;
use super::planner::cut_page;

/// Deleted ids for one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TombstoneSet {
    pub ids: Vec<String>,
    /// Latest deletion instant among `ids`. When `truncated` is set, every
    /// deletion up to this instant has been delivered.
    pub newest_deletion: Option<DateTime<Utc>>,
    /// More deletions exist beyond the ceiling.
    pub truncated: bool,
}

/// Reads tombstones from a [`SyncRepository`].
#[derive(Clone)]
pub struct TombstoneCollector<R> {
    repository: Arc<R>,
}

impl<R> TombstoneCollector<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> TombstoneCollector<R>
where
    R: SyncRepository,
{
    /// Ids of records of `kind` deleted after `checkpoint`, at most `ceiling`.
    ///
    /// Without a checkpoint the client is doing a full sync and needs no
    /// deletions, so the store is not queried.
    pub async fn collect(
        &self,
        kind: EntityKind,
        checkpoint: Option<SyncCheckpoint>,
        owner: Option<&str>,
        ceiling: usize,
    ) -> Result<TombstoneSet, SyncRepositoryError> {
        let Some(checkpoint) = checkpoint else {
            return Ok(TombstoneSet::default());
        };
        let deleted_after = checkpoint.instant();
        let query = TombstoneQuery {
            kind,
            deleted_after,
            owner: owner.map(str::to_owned),
            limit: ceiling.saturating_add(1),
        };

        let mut tombstones: Vec<Tombstone> = self
            .repository
            .tombstones(&query)
            .await?
            .into_iter()
            .filter(|t| t.deleted_at > deleted_after)
            .collect();
        tombstones.sort_by(|a, b| a.deleted_at.cmp(&b.deleted_at).then_with(|| a.id.cmp(&b.id)));

        let truncated = cut_page(&mut tombstones, ceiling, |t| t.deleted_at).is_some();
        if truncated {
            warn!(
                entity = %kind,
                ceiling,
                delivered = tombstones.len(),
                "tombstone list truncated; client must sync again to receive the rest"
            );
        }

        Ok(TombstoneSet {
            newest_deletion: tombstones.iter().map(|t| t.deleted_at).max(),
            ids: tombstones.into_iter().map(|t| t.id).collect(),
            truncated,
        })
    }
}
