//! Builders wiring adapters into HTTP and WebSocket state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use catalog_backend::domain::notifications::{FanoutConfig, NotificationFanoutService};
use catalog_backend::domain::ports::{
    DeltaSyncQuery, LiveConnectionRegistry, NotificationCommand, NotificationRepository,
    RecipientDirectory, SyncRepository,
};
use catalog_backend::domain::sync::{DeltaSyncConfig, DeltaSyncService};
use catalog_backend::inbound::http::state::HttpState;
use catalog_backend::inbound::ws::OriginAllowList;
use catalog_backend::inbound::ws::registry::WsConnectionRegistry;
use catalog_backend::inbound::ws::state::WsState;
use catalog_backend::outbound::memory::InMemoryCatalogueStore;
use catalog_backend::outbound::persistence::{
    DieselNotificationRepository, DieselRecipientDirectory, DieselSyncRepository,
};

use super::ServerConfig;

/// Adapter state shared by every worker.
pub(crate) struct AdapterStates {
    pub http: HttpState,
    pub ws: WsState,
}

struct Ports<S, D, N> {
    sync: Arc<S>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

fn wire<S, D, N>(
    ports: Ports<S, D, N>,
    registry: Arc<dyn LiveConnectionRegistry>,
    delta_sync: DeltaSyncConfig,
    fanout: FanoutConfig,
) -> HttpState
where
    S: SyncRepository + 'static,
    D: RecipientDirectory + 'static,
    N: NotificationRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let sync_service: Arc<dyn DeltaSyncQuery> =
        Arc::new(DeltaSyncService::new(ports.sync, Arc::clone(&clock)).with_config(delta_sync));
    let fanout_service: Arc<dyn NotificationCommand> = Arc::new(
        NotificationFanoutService::new(ports.directory, ports.notifications, registry, clock)
            .with_config(fanout),
    );
    HttpState::new(sync_service, fanout_service)
}

/// Build HTTP and WebSocket state from the server configuration.
///
/// Uses the Diesel adapters when a pool is configured and the in-memory
/// store otherwise.
pub(crate) fn build_states(config: &ServerConfig) -> AdapterStates {
    let registry = Arc::new(WsConnectionRegistry::new());
    let live: Arc<dyn LiveConnectionRegistry> = registry.clone();
    let delta_sync = config.delta_sync.clone();
    let fanout = config.fanout;

    let http = match &config.db_pool {
        Some(pool) => wire(
            Ports {
                sync: Arc::new(DieselSyncRepository::new(pool.clone())),
                directory: Arc::new(DieselRecipientDirectory::new(pool.clone())),
                notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            },
            live,
            delta_sync,
            fanout,
        ),
        None => {
            warn!("no database configured; serving from the in-memory store");
            let store = Arc::new(InMemoryCatalogueStore::new());
            wire(
                Ports {
                    sync: Arc::clone(&store),
                    directory: Arc::clone(&store),
                    notifications: store,
                },
                live,
                delta_sync,
                fanout,
            )
        }
    };

    let ws = WsState::new(
        registry,
        OriginAllowList::new(config.allowed_origin_host.as_str()),
    );
    AdapterStates { http, ws }
}
