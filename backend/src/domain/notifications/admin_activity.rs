//! Admin activity and promotional broadcast triggers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{LocalizedContent, LocalizedText, TemplateParams};

/// Something admins should hear about.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminActivity {
    /// Machine-readable activity name, for example `product_created`.
    pub activity_type: String,
    pub title: LocalizedContent,
    pub message: LocalizedContent,
    pub extra: Map<String, Value>,
}

/// Change applied to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductChangeAction {
    Created,
    Updated,
    Deleted,
}

impl ProductChangeAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

fn params<const N: usize>(pairs: [(&str, &str); N]) -> TemplateParams {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl AdminActivity {
    /// Activity with caller-supplied copy.
    pub fn custom(
        activity_type: impl Into<String>,
        title: LocalizedText,
        message: LocalizedText,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            activity_type: activity_type.into(),
            title: LocalizedContent::Text(title),
            message: LocalizedContent::Text(message),
            extra,
        }
    }

    /// A user signed up. Falls back to the e-mail local part when the user
    /// gave no name.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::{Locale, LocalizationResolver};
    /// use catalog_backend::domain::notifications::AdminActivity;
    ///
    /// let activity = AdminActivity::new_user_registered("sara@example.test", None);
    /// let message = activity.message.render(&LocalizationResolver::builtin(), Locale::En);
    /// assert_eq!(message, "New user registered: sara");
    /// ```
    pub fn new_user_registered(email: &str, name: Option<&str>) -> Self {
        let display_name = non_blank(name)
            .or_else(|| email.split('@').next())
            .unwrap_or(email);
        let mut extra = Map::new();
        extra.insert("user_email".to_owned(), json!(email));
        Self {
            activity_type: "new_user".to_owned(),
            title: LocalizedContent::template("admin.new_user.title", TemplateParams::new()),
            message: LocalizedContent::template(
                "admin.new_user.message",
                params([("display_name", display_name)]),
            ),
            extra,
        }
    }

    /// A product was created, updated, or deleted, optionally by a named admin.
    pub fn product_changed(
        action: ProductChangeAction,
        product_id: &str,
        product_name: &str,
        actor: Option<&str>,
    ) -> Self {
        let action_name = action.as_str();
        let message = match non_blank(actor) {
            Some(actor) => LocalizedContent::template(
                format!("admin.product_{action_name}.message_by"),
                params([("product_name", product_name), ("actor", actor)]),
            ),
            None => LocalizedContent::template(
                format!("admin.product_{action_name}.message"),
                params([("product_name", product_name)]),
            ),
        };
        let mut extra = Map::new();
        extra.insert("product_id".to_owned(), json!(product_id));
        extra.insert("action".to_owned(), json!(action_name));
        Self {
            activity_type: format!("product_{action_name}"),
            title: LocalizedContent::template(
                format!("admin.product_{action_name}.title"),
                TemplateParams::new(),
            ),
            message,
            extra,
        }
    }

    /// An order was cancelled. `cancelled_by` defaults to `customer`.
    pub fn order_cancelled(
        order_id: &str,
        order_number: &str,
        customer_name: Option<&str>,
        cancelled_by: Option<&str>,
    ) -> Self {
        let message = match non_blank(customer_name) {
            Some(customer) => LocalizedContent::template(
                "admin.order_cancelled.message_by",
                params([("order_number", order_number), ("customer", customer)]),
            ),
            None => LocalizedContent::template(
                "admin.order_cancelled.message",
                params([("order_number", order_number)]),
            ),
        };
        let mut extra = Map::new();
        extra.insert("order_id".to_owned(), json!(order_id));
        extra.insert("order_number".to_owned(), json!(order_number));
        extra.insert(
            "cancelled_by".to_owned(),
            json!(non_blank(cancelled_by).unwrap_or("customer")),
        );
        Self {
            activity_type: "order_cancelled".to_owned(),
            title: LocalizedContent::template("admin.order_cancelled.title", TemplateParams::new()),
            message,
            extra,
        }
    }
}

/// Admin activity as reported by another service.
///
/// Each variant maps onto one [`AdminActivity`] builder; `custom` carries its
/// own copy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "activity", rename_all = "snake_case")]
pub enum AdminActivityReport {
    NewUser {
        email: String,
        #[serde(default)]
        name: Option<String>,
    },
    ProductChanged {
        action: ProductChangeAction,
        product_id: String,
        product_name: String,
        #[serde(default)]
        actor: Option<String>,
    },
    OrderCancelled {
        order_id: String,
        order_number: String,
        #[serde(default)]
        customer_name: Option<String>,
        #[serde(default)]
        cancelled_by: Option<String>,
    },
    Custom {
        activity_type: String,
        title: String,
        title_ar: String,
        message: String,
        message_ar: String,
        #[serde(default)]
        extra: Map<String, Value>,
    },
}

impl AdminActivityReport {
    /// Fields that must not be blank, with their values.
    pub fn required_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::NewUser { email, .. } => vec![("email", email.as_str())],
            Self::ProductChanged {
                product_id,
                product_name,
                ..
            } => vec![
                ("product_id", product_id.as_str()),
                ("product_name", product_name.as_str()),
            ],
            Self::OrderCancelled {
                order_id,
                order_number,
                ..
            } => vec![
                ("order_id", order_id.as_str()),
                ("order_number", order_number.as_str()),
            ],
            Self::Custom {
                activity_type,
                title,
                message,
                ..
            } => vec![
                ("activity_type", activity_type.as_str()),
                ("title", title.as_str()),
                ("message", message.as_str()),
            ],
        }
    }
}

impl From<AdminActivityReport> for AdminActivity {
    fn from(report: AdminActivityReport) -> Self {
        match report {
            AdminActivityReport::NewUser { email, name } => {
                Self::new_user_registered(&email, name.as_deref())
            }
            AdminActivityReport::ProductChanged {
                action,
                product_id,
                product_name,
                actor,
            } => Self::product_changed(action, &product_id, &product_name, actor.as_deref()),
            AdminActivityReport::OrderCancelled {
                order_id,
                order_number,
                customer_name,
                cancelled_by,
            } => Self::order_cancelled(
                &order_id,
                &order_number,
                customer_name.as_deref(),
                cancelled_by.as_deref(),
            ),
            AdminActivityReport::Custom {
                activity_type,
                title,
                title_ar,
                message,
                message_ar,
                extra,
            } => Self::custom(
                activity_type,
                LocalizedText::new(title, title_ar),
                LocalizedText::new(message, message_ar),
                extra,
            ),
        }
    }
}

/// Marketing message sent to every active user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionalBroadcast {
    pub title: String,
    pub title_ar: String,
    pub message: String,
    pub message_ar: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub promotion_id: Option<String>,
    #[serde(default)]
    pub bundle_id: Option<String>,
}

impl PromotionalBroadcast {
    pub fn title_text(&self) -> LocalizedText {
        LocalizedText::new(self.title.clone(), self.title_ar.clone())
    }

    pub fn message_text(&self) -> LocalizedText {
        LocalizedText::new(self.message.clone(), self.message_ar.clone())
    }

    /// Extra payload. Image and target urls are always present (possibly
    /// null); promotion and bundle ids only when set.
    pub fn extra(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("image_url".to_owned(), json!(self.image_url));
        extra.insert("target_url".to_owned(), json!(self.target_url));
        if let Some(id) = &self.promotion_id {
            extra.insert("promotion_id".to_owned(), json!(id));
        }
        if let Some(id) = &self.bundle_id {
            extra.insert("bundle_id".to_owned(), json!(id));
        }
        extra
    }
}
