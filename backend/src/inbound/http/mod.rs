//! HTTP inbound adapter exposing REST endpoints.

pub mod delta_sync;
pub mod error;
pub mod health;
pub mod notifications;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
