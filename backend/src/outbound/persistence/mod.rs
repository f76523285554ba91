//! PostgreSQL adapters built on Diesel and `diesel-async`.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; repositories convert rows into domain records before
//! returning them. Pool and Diesel failures are mapped onto each port's
//! `Connection` and `Query` variants in `error_mapping.rs`.
//!
//! ```ignore
//! use catalog_backend::outbound::persistence::{DbPool, DieselSyncRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/catalog")).await?;
//! let repo = DieselSyncRepository::new(pool);
//! ```

mod diesel_notification_repository;
mod diesel_recipient_directory;
mod diesel_sync_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_recipient_directory::DieselRecipientDirectory;
pub use diesel_sync_repository::DieselSyncRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
