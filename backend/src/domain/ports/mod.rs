//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`SyncRepository`, `RecipientDirectory`,
//! `NotificationRepository`, `LiveConnectionRegistry`) are implemented by
//! outbound adapters. Driving ports (`DeltaSyncQuery`, `NotificationCommand`)
//! are implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod delta_sync_query;
mod live_connection_registry;
mod notification_command;
mod notification_repository;
mod recipient_directory;
mod sync_repository;

#[cfg(test)]
pub use delta_sync_query::MockDeltaSyncQuery;
pub use delta_sync_query::{
    CombinedDelta, CombinedDeltaRequest, DeltaSyncQuery, EntityChanges, EntityDelta,
    EntityDeltaRequest, FixtureDeltaSyncQuery,
};
#[cfg(test)]
pub use live_connection_registry::MockLiveConnectionRegistry;
pub use live_connection_registry::{FixtureLiveConnectionRegistry, LiveConnectionRegistry};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::{FixtureNotificationCommand, NotificationCommand};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use recipient_directory::MockRecipientDirectory;
pub use recipient_directory::{
    FixtureRecipientDirectory, RecipientDirectory, RecipientDirectoryError, RecipientFilter,
};
#[cfg(test)]
pub use sync_repository::MockSyncRepository;
pub use sync_repository::{
    FixtureSyncRepository, RecordQuery, SyncRepository, SyncRepositoryError, Tombstone,
    TombstoneQuery,
};
