//! Backend entry-point: loads settings, wires adapters, and serves HTTP and WebSocket traffic.

mod server;

use std::net::{IpAddr, SocketAddr};

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use catalog_backend::inbound::http::health::HealthState;
use catalog_backend::outbound::persistence::{DbPool, PoolConfig};
use catalog_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;

    let host: IpAddr = settings.bind_host().parse().map_err(|e| {
        std::io::Error::other(format!("invalid bind host {}: {e}", settings.bind_host()))
    })?;
    let bind_addr = SocketAddr::new(host, settings.port());

    let mut config = ServerConfig::new(bind_addr)
        .with_delta_sync_config(settings.delta_sync_config())
        .with_fanout_config(settings.fanout_config())
        .with_allowed_origin_host(settings.allowed_origin_host());

    if let Some(url) = settings.database_url() {
        let pool_config = PoolConfig::new(url).with_max_size(settings.db_max_connections());
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "catalog backend listening");
    server.await
}
