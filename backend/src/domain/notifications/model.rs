//! Notification records, recipients, and dispatch outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::Locale;

/// Business area a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Order,
    Promotion,
    AdminActivity,
}

impl NotificationCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Promotion => "promotion",
            Self::AdminActivity => "admin_activity",
        }
    }
}

/// Presentation hint for clients, serialized as the notification `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Success,
    Warning,
    Promo,
    Admin,
}

impl NotificationSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Promo => "promo",
            Self::Admin => "admin",
        }
    }
}

/// A persisted, per-recipient notification.
///
/// Notifications are append-only from the fanout engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: NotificationSeverity,
    #[serde(rename = "notification_category")]
    pub category: NotificationCategory,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account role as stored on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Customer,
    Owner,
    Partner,
    Admin,
    Other(String),
}

impl UserRole {
    /// Roles that receive admin activity notifications.
    pub const ADMIN_ROLES: [Self; 3] = [Self::Owner, Self::Partner, Self::Admin];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "customer",
            Self::Owner => "owner",
            Self::Partner => "partner",
            Self::Admin => "admin",
            Self::Other(role) => role.as_str(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Partner | Self::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Self::Customer,
            "owner" => Self::Owner,
            "partner" => Self::Partner,
            "admin" => Self::Admin,
            _ => Self::Other(value.to_owned()),
        }
    }
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_owned()
    }
}

/// A user who can receive notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub role: UserRole,
    pub preferred_language: Option<String>,
}

impl Recipient {
    /// Locale used to render this recipient's notifications.
    pub fn locale(&self) -> Locale {
        Locale::from_preference(self.preferred_language.as_deref())
    }
}

/// Result of pushing one notification to live connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// At least one live session accepted the frame.
    Delivered,
    /// No live session; the persisted record waits for the next fetch.
    Queued,
    /// Push was attempted and failed; the persisted record still exists.
    Dropped,
}

/// Recipient whose notification could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub recipient_id: String,
    pub reason: String,
}

/// Summary of one fanout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    /// Notifications that were persisted.
    pub notifications: Vec<Notification>,
    pub delivered: usize,
    pub queued: usize,
    pub dropped: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    /// Number of persisted notifications.
    pub fn created(&self) -> usize {
        self.notifications.len()
    }

    pub(crate) fn record_delivery(&mut self, notification: Notification, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Queued => self.queued += 1,
            DeliveryOutcome::Dropped => self.dropped += 1,
        }
        self.notifications.push(notification);
    }

    pub(crate) fn record_failure(&mut self, recipient_id: String, reason: String) {
        self.failures.push(DispatchFailure {
            recipient_id,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("owner", true)]
    #[case("Partner", true)]
    #[case("admin", true)]
    #[case("customer", false)]
    #[case("driver", false)]
    fn admin_roles_are_recognised(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(UserRole::from(raw).is_admin(), expected);
    }

    #[rstest]
    #[case(None, Locale::Ar)]
    #[case(Some("en"), Locale::En)]
    #[case(Some("ar"), Locale::Ar)]
    #[case(Some("tr"), Locale::En)]
    fn recipient_locale_defaults_to_arabic(
        #[case] preferred: Option<&str>,
        #[case] expected: Locale,
    ) {
        let recipient = Recipient {
            id: "u1".to_owned(),
            role: UserRole::Customer,
            preferred_language: preferred.map(str::to_owned),
        };
        assert_eq!(recipient.locale(), expected);
    }

    #[rstest]
    fn notification_serialises_type_category_and_extra() {
        let mut extra = Map::new();
        extra.insert("order_number".to_owned(), json!("ORD-1"));
        let notification = Notification {
            id: Uuid::nil(),
            user_id: "u1".to_owned(),
            title: "Order Shipped".to_owned(),
            message: "Your order ORD-1 has been shipped".to_owned(),
            severity: NotificationSeverity::Info,
            category: NotificationCategory::Order,
            read: false,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
            extra,
        };

        let value = serde_json::to_value(&notification).expect("notification serialises");
        assert_eq!(value["type"], json!("info"));
        assert_eq!(value["notification_category"], json!("order"));
        assert_eq!(value["order_number"], json!("ORD-1"));
        assert_eq!(value["read"], json!(false));
    }

    #[rstest]
    fn report_counts_outcomes() {
        let mut report = DispatchReport::default();
        report.record_failure("u9".to_owned(), "store down".to_owned());
        assert_eq!(report.created(), 0);
        assert_eq!(report.failures.len(), 1);
    }
}
