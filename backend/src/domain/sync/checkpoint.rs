//! Client sync checkpoints.
//!
//! A checkpoint is the `server_time` a client received on its previous sync,
//! sent back as `last_sync`. Anything that does not parse is treated as if the
//! client had no checkpoint at all, which degrades to a full sync.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Instant after which a client wants to see changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncCheckpoint(DateTime<Utc>);

impl SyncCheckpoint {
    /// Wrap an instant.
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parse an optional client-supplied checkpoint.
    ///
    /// Accepts RFC 3339 (`Z` or numeric offsets), naive date-times with a `T`
    /// or space separator, and bare dates. Naive values are read as UTC.
    /// Blank or malformed input returns `None`.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::sync::SyncCheckpoint;
    ///
    /// let checkpoint = SyncCheckpoint::parse(Some("2024-01-01T00:00:00Z")).unwrap();
    /// assert_eq!(checkpoint.to_string(), "2024-01-01T00:00:00Z");
    /// assert!(SyncCheckpoint::parse(Some("yesterday")).is_none());
    /// assert!(SyncCheckpoint::parse(None).is_none());
    /// ```
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
        let parsed = parse_instant(raw);
        if parsed.is_none() {
            debug!(last_sync = raw, "ignoring unparseable sync checkpoint");
        }
        parsed.map(Self)
    }

    /// The instant this checkpoint represents.
    pub const fn instant(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for SyncCheckpoint {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl fmt::Display for SyncCheckpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Some(instant) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(instant.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
