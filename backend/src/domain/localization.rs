//! Localisation resolver for notification copy.
//!
//! Notification titles and messages are stored as named templates with one
//! rendering per supported locale. Rendering never fails: unsupported locales
//! fall back to English, unknown template keys render as the key itself, and
//! placeholders without a matching parameter stay in the output verbatim so a
//! degraded message is still delivered.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named parameters substituted into `{placeholder}` slots.
pub type TemplateParams = BTreeMap<String, String>;

/// Supported notification locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English, also the fallback for unsupported tags.
    #[default]
    En,
    /// Arabic.
    Ar,
}

impl Locale {
    /// Locale assumed for recipients that never stored a preference.
    pub const RECIPIENT_DEFAULT: Self = Self::Ar;

    /// Resolve a language tag, falling back to English when unsupported.
    ///
    /// Region subtags are ignored, so `ar-EG` resolves to Arabic.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::Locale;
    ///
    /// assert_eq!(Locale::from_tag("ar-EG"), Locale::Ar);
    /// assert_eq!(Locale::from_tag("fr"), Locale::En);
    /// ```
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ar" => Self::Ar,
            _ => Self::En,
        }
    }

    /// Resolve an optional stored preference; absent preferences use
    /// [`Locale::RECIPIENT_DEFAULT`].
    pub fn from_preference(tag: Option<&str>) -> Self {
        tag.map_or(Self::RECIPIENT_DEFAULT, Self::from_tag)
    }

    /// Two-letter language code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of copy rendered in every supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// English rendering.
    pub en: String,
    /// Arabic rendering.
    pub ar: String,
}

impl LocalizedText {
    /// Build localized text from its English and Arabic renderings.
    pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ar: ar.into(),
        }
    }

    /// Borrow the rendering for `locale`.
    pub fn for_locale(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => self.en.as_str(),
            Locale::Ar => self.ar.as_str(),
        }
    }
}

/// Copy that is either already localized or rendered from a named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizedContent {
    /// Caller-supplied text for each locale, used verbatim.
    Text(LocalizedText),
    /// Template key resolved through [`LocalizationResolver`].
    Template {
        /// Template identifier, for example `admin.new_user.title`.
        key: String,
        /// Placeholder values.
        params: TemplateParams,
    },
}

impl LocalizedContent {
    /// Build template-backed content.
    pub fn template(key: impl Into<String>, params: TemplateParams) -> Self {
        Self::Template {
            key: key.into(),
            params,
        }
    }

    /// Render the content for `locale`.
    pub fn render(&self, resolver: &LocalizationResolver, locale: Locale) -> String {
        match self {
            Self::Text(text) => text.for_locale(locale).to_owned(),
            Self::Template { key, params } => resolver.resolve(key, locale, params),
        }
    }
}

/// Maps `(template key, locale, params)` to rendered strings.
#[derive(Debug, Clone, Default)]
pub struct LocalizationResolver {
    templates: BTreeMap<String, LocalizedText>,
}

impl LocalizationResolver {
    /// Resolver without any templates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolver preloaded with the built-in notification templates.
    pub fn builtin() -> Self {
        let mut resolver = Self::empty();
        for (key, en, ar) in BUILTIN_TEMPLATES {
            resolver.register(*key, LocalizedText::new(*en, *ar));
        }
        resolver
    }

    /// Register or replace a template.
    pub fn register(&mut self, key: impl Into<String>, text: LocalizedText) {
        self.templates.insert(key.into(), text);
    }

    /// Whether a template is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Render `key` for `locale`, substituting `params`.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::{Locale, LocalizationResolver, TemplateParams};
    ///
    /// let resolver = LocalizationResolver::builtin();
    /// let params = TemplateParams::from([("order_number".to_owned(), "ORD-7".to_owned())]);
    /// let title = resolver.resolve("order.status.shipped.message", Locale::En, &params);
    /// assert_eq!(title, "Your order ORD-7 has been shipped");
    /// ```
    pub fn resolve(&self, key: &str, locale: Locale, params: &TemplateParams) -> String {
        match self.templates.get(key) {
            Some(text) => fill_placeholders(text.for_locale(locale), params),
            None => {
                warn!(template = key, %locale, "unknown notification template");
                key.to_owned()
            }
        }
    }
}

/// Substitute `{name}` placeholders from `params`.
///
/// Placeholders without a parameter and unbalanced braces are copied through
/// unchanged.
///
/// # Examples
/// ```
/// use catalog_backend::domain::{TemplateParams, fill_placeholders};
///
/// let params = TemplateParams::from([("name".to_owned(), "Sara".to_owned())]);
/// assert_eq!(fill_placeholders("Hi {name}, {missing}", &params), "Hi Sara, {missing}");
/// ```
pub fn fill_placeholders(template: &str, params: &TemplateParams) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (before, from_open) = rest.split_at(open);
        output.push_str(before);
        let (_, inner) = from_open.split_at(1);

        let Some(end) = inner.find(['{', '}']) else {
            output.push_str(from_open);
            return output;
        };
        let (name, from_end) = inner.split_at(end);
        if from_end.starts_with('{') {
            // Another brace opens before this one closes: this one is literal.
            output.push('{');
            output.push_str(name);
            rest = from_end;
            continue;
        }

        match params.get(name).filter(|_| !name.is_empty()) {
            Some(value) => output.push_str(value),
            None => {
                output.push('{');
                output.push_str(name);
                output.push('}');
            }
        }
        let (_, after) = from_end.split_at(1);
        rest = after;
    }

    output.push_str(rest);
    output
}

const BUILTIN_TEMPLATES: &[(&str, &str, &str)] = &[
    // Order status titles.
    ("order.status.default.title", "Order Update", "تحديث الطلب"),
    ("order.status.preparing.title", "Order Being Prepared", "جاري التحضير"),
    ("order.status.shipped.title", "Order Shipped", "تم الشحن"),
    ("order.status.out_for_delivery.title", "Out for Delivery", "في الطريق"),
    ("order.status.delivered.title", "Order Delivered!", "تم التوصيل!"),
    ("order.status.completed.title", "Order Completed!", "تم إكمال الطلب!"),
    ("order.status.cancelled.title", "Order Cancelled", "تم إلغاء الطلب"),
    // Order status messages.
    (
        "order.status.pending.message",
        "Your order {order_number} has been received and is being processed",
        "تم استلام طلبك {order_number} وجاري معالجته",
    ),
    (
        "order.status.confirmed.message",
        "Your order {order_number} has been confirmed",
        "تم تأكيد طلبك {order_number}",
    ),
    (
        "order.status.preparing.message",
        "Your order {order_number} is being prepared",
        "جاري تحضير طلبك {order_number}",
    ),
    (
        "order.status.shipped.message",
        "Your order {order_number} has been shipped",
        "تم شحن طلبك {order_number}",
    ),
    (
        "order.status.out_for_delivery.message",
        "Your order {order_number} is out for delivery",
        "طلبك {order_number} في الطريق إليك",
    ),
    (
        "order.status.delivered.message",
        "Your order {order_number} has been successfully completed",
        "تم إكمال طلبك {order_number} بنجاح",
    ),
    (
        "order.status.completed.message",
        "Your order {order_number} has been successfully completed",
        "تم إكمال طلبك {order_number} بنجاح",
    ),
    (
        "order.status.cancelled.message",
        "Your order {order_number} has been cancelled",
        "تم إلغاء طلبك {order_number}",
    ),
    (
        "order.status.fallback.message",
        "Your order {order_number} status has been updated to {status}",
        "تم تحديث حالة طلبك {order_number} إلى {status}",
    ),
    // Admin activity.
    ("admin.new_user.title", "New User Registered", "تسجيل مستخدم جديد"),
    (
        "admin.new_user.message",
        "New user registered: {display_name}",
        "تم تسجيل مستخدم جديد: {display_name}",
    ),
    ("admin.product_created.title", "Product Added", "تم إضافة منتج"),
    ("admin.product_updated.title", "Product Updated", "تم تحديث منتج"),
    ("admin.product_deleted.title", "Product Deleted", "تم حذف منتج"),
    (
        "admin.product_created.message",
        "Product '{product_name}' was added",
        "تم إضافة المنتج '{product_name}'",
    ),
    (
        "admin.product_updated.message",
        "Product '{product_name}' was updated",
        "تم تحديث المنتج '{product_name}'",
    ),
    (
        "admin.product_deleted.message",
        "Product '{product_name}' was deleted",
        "تم حذف المنتج '{product_name}'",
    ),
    (
        "admin.product_created.message_by",
        "Product '{product_name}' was added by {actor}",
        "تم إضافة المنتج '{product_name}' بواسطة {actor}",
    ),
    (
        "admin.product_updated.message_by",
        "Product '{product_name}' was updated by {actor}",
        "تم تحديث المنتج '{product_name}' بواسطة {actor}",
    ),
    (
        "admin.product_deleted.message_by",
        "Product '{product_name}' was deleted by {actor}",
        "تم حذف المنتج '{product_name}' بواسطة {actor}",
    ),
    ("admin.order_cancelled.title", "Order Cancelled", "تم إلغاء طلب"),
    (
        "admin.order_cancelled.message",
        "Order {order_number} was cancelled",
        "تم إلغاء الطلب {order_number}",
    ),
    (
        "admin.order_cancelled.message_by",
        "Order {order_number} was cancelled by {customer}",
        "تم إلغاء الطلب {order_number} من قبل {customer}",
    ),
];

#[cfg(test)]
mod tests {
    //! Unit tests for locale resolution and template rendering.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn resolver() -> LocalizationResolver {
        LocalizationResolver::builtin()
    }

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    #[case("en", Locale::En)]
    #[case("ar", Locale::Ar)]
    #[case("AR", Locale::Ar)]
    #[case("ar_SA", Locale::Ar)]
    #[case("fr", Locale::En)]
    #[case("", Locale::En)]
    fn from_tag_falls_back_to_english(#[case] tag: &str, #[case] expected: Locale) {
        assert_eq!(Locale::from_tag(tag), expected);
    }

    #[rstest]
    fn missing_preference_defaults_to_arabic() {
        assert_eq!(Locale::from_preference(None), Locale::Ar);
        assert_eq!(Locale::from_preference(Some("de")), Locale::En);
    }

    #[rstest]
    fn resolves_arabic_shipped_title(resolver: LocalizationResolver) {
        let title = resolver.resolve("order.status.shipped.title", Locale::Ar, &params(&[]));
        assert_eq!(title, "تم الشحن");
    }

    #[rstest]
    fn missing_parameters_stay_literal(resolver: LocalizationResolver) {
        let message = resolver.resolve("order.status.shipped.message", Locale::En, &params(&[]));
        assert_eq!(message, "Your order {order_number} has been shipped");
    }

    #[rstest]
    fn unknown_key_renders_key(resolver: LocalizationResolver) {
        let rendered = resolver.resolve("order.status.nope.title", Locale::En, &params(&[]));
        assert_eq!(rendered, "order.status.nope.title");
    }

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("{a}{b}", "12")]
    #[case("open {a", "open {a")]
    #[case("empty {} braces", "empty {} braces")]
    #[case("nested {{a}}", "nested {1}")]
    #[case("deeper {{{b}}}", "deeper {{2}}")]
    #[case("stray {x{a}", "stray {x1")]
    #[case("{missing}{a}", "{missing}1")]
    #[case("close only }", "close only }")]
    fn fill_placeholders_handles_edge_cases(#[case] template: &str, #[case] expected: &str) {
        let rendered = fill_placeholders(template, &params(&[("a", "1"), ("b", "2")]));
        assert_eq!(rendered, expected);
    }

    #[rstest]
    fn template_content_renders_through_resolver(resolver: LocalizationResolver) {
        let content = LocalizedContent::template(
            "admin.new_user.message",
            params(&[("display_name", "huda")]),
        );
        assert_eq!(
            content.render(&resolver, Locale::Ar),
            "تم تسجيل مستخدم جديد: huda"
        );
    }
}
