//! Order status change events and their notification copy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{Locale, LocalizationResolver, TemplateParams};

use super::model::NotificationSeverity;

/// Lifecycle state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
    /// Status this service has no dedicated copy for.
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Other(status) => status.as_str(),
        }
    }

    const FALLBACK_TITLE_KEY: &'static str = "order.status.default.title";
    const FALLBACK_MESSAGE_KEY: &'static str = "order.status.fallback.message";

    fn title_key(&self) -> &'static str {
        match self {
            Self::Preparing => "order.status.preparing.title",
            Self::Shipped => "order.status.shipped.title",
            Self::OutForDelivery => "order.status.out_for_delivery.title",
            Self::Delivered => "order.status.delivered.title",
            Self::Completed => "order.status.completed.title",
            Self::Cancelled => "order.status.cancelled.title",
            Self::Pending | Self::Confirmed | Self::Other(_) => Self::FALLBACK_TITLE_KEY,
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            Self::Pending => "order.status.pending.message",
            Self::Confirmed => "order.status.confirmed.message",
            Self::Preparing => "order.status.preparing.message",
            Self::Shipped => "order.status.shipped.message",
            Self::OutForDelivery => "order.status.out_for_delivery.message",
            Self::Delivered => "order.status.delivered.message",
            Self::Completed => "order.status.completed.message",
            Self::Cancelled => "order.status.cancelled.message",
            Self::Other(_) => Self::FALLBACK_MESSAGE_KEY,
        }
    }

    /// Severity clients use to style the notification.
    pub fn severity(&self) -> NotificationSeverity {
        match self {
            Self::Delivered | Self::Completed => NotificationSeverity::Success,
            Self::Cancelled => NotificationSeverity::Warning,
            _ => NotificationSeverity::Info,
        }
    }

    /// Status rendered for people: underscores become spaces.
    pub fn humanized(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "preparing" => Self::Preparing,
            "shipped" => Self::Shipped,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// An order moved to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    /// Order owner, the only recipient.
    pub user_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub order_id: Option<String>,
    /// Language tag for the copy; Arabic when absent.
    #[serde(default)]
    pub locale: Option<String>,
}

/// Title, message, and severity resolved for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOrderUpdate {
    pub title: String,
    pub message: String,
    pub severity: NotificationSeverity,
}

impl OrderStatusChanged {
    /// Locale the copy is rendered in.
    pub fn locale(&self) -> Locale {
        Locale::from_preference(self.locale.as_deref())
    }

    /// Render title and message for this event.
    ///
    /// Statuses whose dedicated template is not registered use the generic
    /// status copy.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::LocalizationResolver;
    /// use catalog_backend::domain::notifications::{OrderStatus, OrderStatusChanged};
    ///
    /// let event = OrderStatusChanged {
    ///     user_id: "u1".into(),
    ///     order_number: "ORD-9".into(),
    ///     status: OrderStatus::Shipped,
    ///     order_id: None,
    ///     locale: Some("en".into()),
    /// };
    /// let rendered = event.render(&LocalizationResolver::builtin());
    /// assert_eq!(rendered.title, "Order Shipped");
    /// assert_eq!(rendered.message, "Your order ORD-9 has been shipped");
    /// ```
    pub fn render(&self, resolver: &LocalizationResolver) -> RenderedOrderUpdate {
        let locale = self.locale();
        let params = TemplateParams::from([
            ("order_number".to_owned(), self.order_number.clone()),
            ("status".to_owned(), self.status.humanized()),
        ]);
        let title_key = registered_or(
            resolver,
            self.status.title_key(),
            OrderStatus::FALLBACK_TITLE_KEY,
        );
        let message_key = registered_or(
            resolver,
            self.status.message_key(),
            OrderStatus::FALLBACK_MESSAGE_KEY,
        );
        RenderedOrderUpdate {
            title: resolver.resolve(title_key, locale, &params),
            message: resolver.resolve(message_key, locale, &params),
            severity: self.status.severity(),
        }
    }

    /// Extra payload stored alongside the notification.
    pub fn extra(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("order_id".to_owned(), json!(self.order_id));
        extra.insert("order_number".to_owned(), json!(self.order_number));
        extra.insert("status".to_owned(), json!(self.status.as_str()));
        extra
    }
}

fn registered_or<'a>(
    resolver: &LocalizationResolver,
    key: &'a str,
    fallback: &'a str,
) -> &'a str {
    if resolver.contains(key) { key } else { fallback }
}
