//! Runtime settings loaded via OrthoConfig.
//!
//! Every value can be set through `CATALOG_*` environment variables or the
//! matching command-line flag. Absent values fall back to the defaults
//! below.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::notifications::FanoutConfig;
use crate::domain::sync::{DeltaSyncConfig, EntityKind};

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ORIGIN_HOST: &str = "localhost";

/// Server, storage, sync, and fanout settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATALOG")]
pub struct AppSettings {
    /// Interface to bind the HTTP listener to.
    #[ortho_config(default = String::from(DEFAULT_BIND_HOST))]
    pub bind_host: String,
    /// Port to bind the HTTP listener to.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// PostgreSQL URL. Without one the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = DEFAULT_DB_MAX_CONNECTIONS)]
    pub db_max_connections: u32,
    /// Host whose HTTPS origins (and subdomains) may open notification
    /// sockets.
    #[ortho_config(default = String::from(DEFAULT_ORIGIN_HOST))]
    pub allowed_origin_host: String,
    /// Override for the products page-size ceiling.
    pub products_max_limit: Option<usize>,
    /// Override for the products tombstone ceiling.
    pub products_tombstone_ceiling: Option<usize>,
    /// Recipients processed concurrently during fanout.
    pub max_concurrent_dispatches: Option<usize>,
    /// Maximum recipients of one promotion.
    pub promotion_recipient_cap: Option<usize>,
    /// Maximum recipients of one admin activity.
    pub admin_recipient_cap: Option<usize>,
}

impl AppSettings {
    pub fn bind_host(&self) -> &str {
        &self.bind_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.max(1)
    }

    pub fn allowed_origin_host(&self) -> &str {
        &self.allowed_origin_host
    }

    /// Per-type sync policies with the configured overrides applied.
    pub fn delta_sync_config(&self) -> DeltaSyncConfig {
        let mut config = DeltaSyncConfig::default();
        if let Some(max_limit) = self.products_max_limit {
            config = config.with_max_limit(EntityKind::Products, max_limit.max(1));
        }
        if let Some(ceiling) = self.products_tombstone_ceiling {
            config = config.with_tombstone_ceiling(EntityKind::Products, ceiling);
        }
        config
    }

    /// Fanout limits with the configured overrides applied.
    pub fn fanout_config(&self) -> FanoutConfig {
        let defaults = FanoutConfig::default();
        FanoutConfig {
            max_concurrent_dispatches: self
                .max_concurrent_dispatches
                .unwrap_or(defaults.max_concurrent_dispatches)
                .max(1),
            promotion_recipient_cap: self
                .promotion_recipient_cap
                .unwrap_or(defaults.promotion_recipient_cap),
            admin_recipient_cap: self
                .admin_recipient_cap
                .unwrap_or(defaults.admin_recipient_cap),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "CATALOG_BIND_HOST",
        "CATALOG_PORT",
        "CATALOG_DATABASE_URL",
        "CATALOG_DB_MAX_CONNECTIONS",
        "CATALOG_ALLOWED_ORIGIN_HOST",
        "CATALOG_PRODUCTS_MAX_LIMIT",
        "CATALOG_PRODUCTS_TOMBSTONE_CEILING",
        "CATALOG_MAX_CONCURRENT_DISPATCHES",
        "CATALOG_PROMOTION_RECIPIENT_CAP",
        "CATALOG_ADMIN_RECIPIENT_CAP",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("catalog-backend")])
            .expect("config should load")
    }

    fn cleared_except(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_host(), DEFAULT_BIND_HOST);
        assert_eq!(settings.port(), DEFAULT_PORT);
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert!(settings.database_url().is_none());
        assert_eq!(settings.allowed_origin_host(), DEFAULT_ORIGIN_HOST);
        assert_eq!(
            settings.delta_sync_config().policy(EntityKind::Products),
            EntityKind::Products.default_policy()
        );
        assert_eq!(
            settings.fanout_config().max_concurrent_dispatches,
            FanoutConfig::default().max_concurrent_dispatches
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("CATALOG_PORT", "9090"),
            ("CATALOG_DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_PRODUCTS_MAX_LIMIT", "200"),
            ("CATALOG_MAX_CONCURRENT_DISPATCHES", "0"),
            ("CATALOG_ADMIN_RECIPIENT_CAP", "5"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.port(), 9090);
        assert_eq!(settings.bind_host(), DEFAULT_BIND_HOST);
        assert_eq!(settings.database_url(), Some("postgres://localhost/catalog"));

        let products = settings.delta_sync_config().policy(EntityKind::Products);
        assert_eq!(products.max_limit, 200);
        assert_eq!(products.default_limit, 200);

        let fanout = settings.fanout_config();
        assert_eq!(fanout.max_concurrent_dispatches, 1);
        assert_eq!(fanout.admin_recipient_cap, 5);
    }

    #[rstest]
    fn string_settings_override_their_defaults() {
        let _guard = lock_env(cleared_except(&[
            ("CATALOG_BIND_HOST", "127.0.0.1"),
            ("CATALOG_ALLOWED_ORIGIN_HOST", "shop.example"),
            ("CATALOG_DB_MAX_CONNECTIONS", "0"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_host(), "127.0.0.1");
        assert_eq!(settings.allowed_origin_host(), "shop.example");
        assert_eq!(settings.db_max_connections(), 1);
    }

    #[rstest]
    fn blank_database_url_means_in_memory() {
        let _guard = lock_env(cleared_except(&[("CATALOG_DATABASE_URL", "  ")]));
        assert!(load_from_empty_args().database_url().is_none());
    }
}
