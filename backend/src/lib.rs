//! Catalogue delta sync and notification fanout backend.
//!
//! - [`domain`]: sync and fanout logic behind port traits
//! - [`inbound`]: HTTP and WebSocket adapters
//! - [`outbound`]: PostgreSQL and in-memory adapters
//! - [`settings`]: OrthoConfig-backed runtime settings

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
