//! Domain primitives, services, and ports.
//!
//! Purpose: hold the delta sync and notification fanout logic independent of
//! HTTP, WebSocket, and storage concerns. Adapters reach the domain only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error, ErrorCode: transport-agnostic failure payload.
//! - Catalogue records (Product, Category, ...) and the SyncItem response view.
//! - [`sync`]: checkpoint codec, change-set planner, tombstone collector, and
//!   the DeltaSyncService aggregator.
//! - [`notifications`]: triggers, templates, and the fanout engine.
//! - Locale and LocalizationResolver for notification copy.

pub mod catalogue;
pub mod error;
pub mod localization;
pub mod notifications;
pub mod ports;
pub mod sync;

pub use self::catalogue::{
    CarBrand, CarModel, Category, Order, Product, ProductBrand, ProductEnrichment, ProductView,
    StoredRecord, SyncItem,
};
pub use self::error::{Error, ErrorCode};
pub use self::localization::{
    Locale, LocalizationResolver, LocalizedContent, LocalizedText, TemplateParams,
    fill_placeholders,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use catalog_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::invalid_request("unknown table"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
