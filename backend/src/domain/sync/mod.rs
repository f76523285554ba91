//! Incremental synchronization of catalogue and order collections.
//!
//! Clients send the `server_time` of their previous sync as a checkpoint and
//! receive the records changed since then, the ids deleted since then, and a
//! fresh checkpoint.

mod checkpoint;
mod entity;
mod planner;
mod service;
mod tombstones;

pub use checkpoint::SyncCheckpoint;
pub use entity::{DeltaSyncConfig, EntityKind, EntityPolicy, SortOrder};
pub use planner::{ChangeSet, ChangeSetPlanner, ChangeSetRequest};
pub use service::DeltaSyncService;
pub use tombstones::{TombstoneCollector, TombstoneSet};
