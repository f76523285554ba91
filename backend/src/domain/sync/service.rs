//! Delta sync service implementing the [`DeltaSyncQuery`] driving port.
//!
//! Each entity type is an independent pass of the planner and the tombstone
//! collector. The combined endpoint runs its passes concurrently; a type whose
//! query fails is reported in `failed_tables` while an unreachable store fails
//! the whole request.
//!
//! When any pass is truncated, `server_time` is the earliest instant up to
//! which every returned pass is complete, so a client that stores it and syncs
//! again receives the rows left out.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::{join_all, try_join};
use mockable::Clock;
use tracing::{debug, error};

use crate::domain::Error;
use crate::domain::ports::{
    CombinedDelta, CombinedDeltaRequest, DeltaSyncQuery, EntityChanges, EntityDelta,
    EntityDeltaRequest, SyncRepository, SyncRepositoryError,
};

use super::checkpoint::SyncCheckpoint;
use super::entity::{DeltaSyncConfig, EntityKind};
use super::planner::{ChangeSetPlanner, ChangeSetRequest};
use super::tombstones::TombstoneCollector;

/// One entity pass with the newest timestamp it observed.
struct PassOutcome {
    changes: EntityChanges,
    newest: Option<DateTime<Utc>>,
    /// Set when the pass was truncated: the pass is complete up to here.
    resume_after: Option<DateTime<Utc>>,
}

/// Delta sync over a [`SyncRepository`].
#[derive(Clone)]
pub struct DeltaSyncService<R> {
    planner: ChangeSetPlanner<R>,
    tombstones: TombstoneCollector<R>,
    clock: Arc<dyn Clock>,
    config: DeltaSyncConfig,
}

impl<R> DeltaSyncService<R> {
    /// Create a service with the built-in per-type policies.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            planner: ChangeSetPlanner::new(Arc::clone(&repository)),
            tombstones: TombstoneCollector::new(repository),
            clock,
            config: DeltaSyncConfig::default(),
        }
    }

    /// Replace the per-type policies.
    pub fn with_config(mut self, config: DeltaSyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve the `tables` parameter.
    ///
    /// Absent or blank input selects [`EntityKind::DEFAULT_COMBINED`]. Unknown
    /// names are skipped and duplicates collapse.
    pub fn requested_kinds(tables: Option<&str>) -> BTreeSet<EntityKind> {
        match tables.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => EntityKind::DEFAULT_COMBINED.into_iter().collect(),
            Some(raw) => raw
                .split(',')
                .filter_map(|name| {
                    let kind = EntityKind::from_table_name(name);
                    if kind.is_none() && !name.trim().is_empty() {
                        debug!(table = name.trim(), "ignoring unknown sync table");
                    }
                    kind
                })
                .collect(),
        }
    }

    /// `server_time` for a response.
    ///
    /// A truncated pass pins it to the earliest resume bound. Otherwise it is
    /// the clock reading taken after all reads, raised to the newest returned
    /// timestamp if the store runs ahead.
    fn server_time<'a>(
        &self,
        outcomes: impl IntoIterator<Item = &'a PassOutcome>,
    ) -> DateTime<Utc> {
        let now = self.clock.utc();
        let mut newest = now;
        let mut resume: Option<DateTime<Utc>> = None;
        for outcome in outcomes {
            if let Some(seen) = outcome.newest {
                newest = newest.max(seen);
            }
            if let Some(bound) = outcome.resume_after {
                resume = Some(resume.map_or(bound, |current| current.min(bound)));
            }
        }
        resume.unwrap_or(newest)
    }
}

impl<R> DeltaSyncService<R>
where
    R: SyncRepository,
{
    async fn run_pass(
        &self,
        kind: EntityKind,
        checkpoint: Option<SyncCheckpoint>,
        limit: Option<usize>,
        owner: Option<&str>,
    ) -> Result<PassOutcome, SyncRepositoryError> {
        let policy = self.config.policy(kind);
        let owner = owner.filter(|_| kind.is_user_scoped());
        let request = ChangeSetRequest {
            kind,
            checkpoint,
            limit: policy.effective_limit(limit),
            owner: owner.map(str::to_owned),
        };

        let (change_set, tombstones) = try_join(
            self.planner.plan(&request, &policy),
            self.tombstones
                .collect(kind, checkpoint, owner, policy.tombstone_ceiling),
        )
        .await?;

        let newest_update = change_set.items.iter().map(|item| item.updated_at()).max();
        let resume_after = [
            change_set.resume_after,
            tombstones.newest_deletion.filter(|_| tombstones.truncated),
        ]
        .into_iter()
        .flatten()
        .min();
        Ok(PassOutcome {
            newest: newest_update.max(tombstones.newest_deletion),
            resume_after,
            changes: EntityChanges {
                items: change_set.items,
                deleted_ids: tombstones.ids,
                has_more: change_set.has_more,
            },
        })
    }

    fn map_repository_error(kind: EntityKind, err: &SyncRepositoryError) -> Error {
        match err {
            SyncRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("sync store unavailable: {message}"))
            }
            SyncRepositoryError::Query { message } => {
                Error::internal(format!("failed to read {kind} changes: {message}"))
            }
        }
    }
}

#[async_trait]
impl<R> DeltaSyncQuery for DeltaSyncService<R>
where
    R: SyncRepository + 'static,
{
    async fn entity_delta(&self, request: EntityDeltaRequest) -> Result<EntityDelta, Error> {
        let checkpoint = SyncCheckpoint::parse(request.last_sync.as_deref());
        let outcome = self
            .run_pass(
                request.kind,
                checkpoint,
                request.limit,
                request.owner.as_deref(),
            )
            .await
            .map_err(|err| {
                error!(entity = %request.kind, error = %err, "delta sync failed");
                Self::map_repository_error(request.kind, &err)
            })?;

        Ok(EntityDelta {
            kind: request.kind,
            server_time: self.server_time([&outcome]),
            is_delta: checkpoint.is_some(),
            changes: outcome.changes,
        })
    }

    async fn combined_delta(&self, request: CombinedDeltaRequest) -> Result<CombinedDelta, Error> {
        let checkpoint = SyncCheckpoint::parse(request.last_sync.as_deref());
        let kinds = Self::requested_kinds(request.tables.as_deref());
        let owner = request.owner.as_deref();
        let limit = request.limit;

        let passes = kinds.iter().copied().map(|kind| async move {
            let outcome = self.run_pass(kind, checkpoint, limit, owner).await;
            (kind, outcome)
        });
        let results = join_all(passes).await;

        let mut outcomes = Vec::with_capacity(results.len());
        let mut failed_tables = Vec::new();
        for (kind, result) in results {
            match result {
                Ok(outcome) => outcomes.push((kind, outcome)),
                Err(err @ SyncRepositoryError::Connection { .. }) => {
                    error!(entity = %kind, error = %err, "sync store unreachable");
                    return Err(Self::map_repository_error(kind, &err));
                }
                Err(err @ SyncRepositoryError::Query { .. }) => {
                    error!(entity = %kind, error = %err, "combined delta pass failed");
                    failed_tables.push(kind);
                }
            }
        }

        let server_time = self.server_time(outcomes.iter().map(|(_, outcome)| outcome));
        let data: BTreeMap<_, _> = outcomes
            .into_iter()
            .map(|(kind, outcome)| (kind, outcome.changes))
            .collect();

        Ok(CombinedDelta {
            server_time,
            is_delta: checkpoint.is_some(),
            data,
            failed_tables,
        })
    }
}
