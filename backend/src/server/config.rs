//! HTTP server configuration object.

use std::net::SocketAddr;

use catalog_backend::domain::notifications::FanoutConfig;
use catalog_backend::domain::sync::DeltaSyncConfig;
use catalog_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) delta_sync: DeltaSyncConfig,
    pub(crate) fanout: FanoutConfig,
    pub(crate) allowed_origin_host: String,
}

impl ServerConfig {
    /// Configuration with default policies and no database.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            delta_sync: DeltaSyncConfig::default(),
            fanout: FanoutConfig::default(),
            allowed_origin_host: "localhost".to_owned(),
        }
    }

    /// Attach a database pool; without one the in-memory store is used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_delta_sync_config(mut self, config: DeltaSyncConfig) -> Self {
        self.delta_sync = config;
        self
    }

    #[must_use]
    pub fn with_fanout_config(mut self, config: FanoutConfig) -> Self {
        self.fanout = config;
        self
    }

    /// Host whose HTTPS origins may open notification sockets.
    #[must_use]
    pub fn with_allowed_origin_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_origin_host = host.into();
        self
    }
}
