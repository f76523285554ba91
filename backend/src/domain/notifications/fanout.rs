//! Notification fanout engine.
//!
//! A trigger is expanded into one notification per recipient, rendered in the
//! recipient's locale. Each notification is persisted and then pushed to live
//! connections. Recipients are processed as a bounded-concurrency group and a
//! failure for one recipient never affects the others.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use mockable::Clock;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    LiveConnectionRegistry, NotificationCommand, NotificationRepository, RecipientDirectory,
    RecipientDirectoryError, RecipientFilter,
};
use crate::domain::{Error, LocalizationResolver};

use super::admin_activity::{AdminActivity, PromotionalBroadcast};
use super::model::{
    DeliveryOutcome, DispatchReport, Notification, NotificationCategory, NotificationSeverity,
    Recipient,
};
use super::order_status::OrderStatusChanged;
use super::trigger::NotificationTrigger;

/// Tunables for the fanout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutConfig {
    /// Recipients processed at the same time.
    pub max_concurrent_dispatches: usize,
    /// Maximum recipients of one promotion.
    pub promotion_recipient_cap: usize,
    /// Maximum recipients of one admin activity.
    pub admin_recipient_cap: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatches: 16,
            promotion_recipient_cap: 10_000,
            admin_recipient_cap: 1_000,
        }
    }
}

/// Notification content addressed to one recipient, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
struct Draft {
    recipient_id: String,
    title: String,
    message: String,
    severity: NotificationSeverity,
    category: NotificationCategory,
    extra: Map<String, Value>,
}

/// Fanout service implementing [`NotificationCommand`].
#[derive(Clone)]
pub struct NotificationFanoutService<D, N> {
    directory: Arc<D>,
    notifications: Arc<N>,
    registry: Arc<dyn LiveConnectionRegistry>,
    resolver: Arc<LocalizationResolver>,
    clock: Arc<dyn Clock>,
    config: FanoutConfig,
}

impl<D, N> NotificationFanoutService<D, N> {
    /// Create a service with the built-in templates and default tunables.
    pub fn new(
        directory: Arc<D>,
        notifications: Arc<N>,
        registry: Arc<dyn LiveConnectionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            notifications,
            registry,
            resolver: Arc::new(LocalizationResolver::builtin()),
            clock,
            config: FanoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FanoutConfig) -> Self {
        self.config = config;
        self
    }

    fn order_drafts(&self, event: &OrderStatusChanged) -> Vec<Draft> {
        let rendered = event.render(&self.resolver);
        vec![Draft {
            recipient_id: event.user_id.clone(),
            title: rendered.title,
            message: rendered.message,
            severity: rendered.severity,
            category: NotificationCategory::Order,
            extra: event.extra(),
        }]
    }
}

impl<D, N> NotificationFanoutService<D, N>
where
    D: RecipientDirectory,
    N: NotificationRepository,
{
    fn map_directory_error(err: &RecipientDirectoryError) -> Error {
        match err {
            RecipientDirectoryError::Connection { message } => {
                Error::service_unavailable(format!("recipient directory unavailable: {message}"))
            }
            RecipientDirectoryError::Query { message } => {
                Error::internal(format!("recipient lookup failed: {message}"))
            }
        }
    }

    async fn recipients(
        &self,
        filter: RecipientFilter,
        trigger: &'static str,
    ) -> Result<Vec<Recipient>, Error> {
        let recipients = self
            .directory
            .active_recipients(&filter)
            .await
            .map_err(|err| {
                error!(trigger, error = %err, "failed to resolve notification recipients");
                Self::map_directory_error(&err)
            })?;
        if recipients.len() >= filter.limit {
            warn!(
                trigger,
                cap = filter.limit,
                "recipient list reached its cap; remaining users are not notified"
            );
        }
        Ok(recipients)
    }

    async fn promotion_drafts(&self, promotion: &PromotionalBroadcast) -> Result<Vec<Draft>, Error> {
        let recipients = self
            .recipients(
                RecipientFilter::everyone(self.config.promotion_recipient_cap),
                "promotion",
            )
            .await?;
        let title = promotion.title_text();
        let message = promotion.message_text();
        let extra = promotion.extra();

        Ok(recipients
            .into_iter()
            .map(|recipient| {
                let locale = recipient.locale();
                Draft {
                    title: title.for_locale(locale).to_owned(),
                    message: message.for_locale(locale).to_owned(),
                    severity: NotificationSeverity::Promo,
                    category: NotificationCategory::Promotion,
                    extra: extra.clone(),
                    recipient_id: recipient.id,
                }
            })
            .collect())
    }

    async fn admin_drafts(&self, activity: &AdminActivity) -> Result<Vec<Draft>, Error> {
        let recipients = self
            .recipients(
                RecipientFilter::admins(self.config.admin_recipient_cap),
                "admin_activity",
            )
            .await?;
        let mut extra = Map::new();
        extra.insert("activity_type".to_owned(), json!(activity.activity_type));
        extra.extend(activity.extra.clone());

        Ok(recipients
            .into_iter()
            .map(|recipient| {
                let locale = recipient.locale();
                Draft {
                    title: activity.title.render(&self.resolver, locale),
                    message: activity.message.render(&self.resolver, locale),
                    severity: NotificationSeverity::Admin,
                    category: NotificationCategory::AdminActivity,
                    extra: extra.clone(),
                    recipient_id: recipient.id,
                }
            })
            .collect())
    }

    /// Persist then push one notification.
    async fn deliver(&self, draft: Draft) -> Result<(Notification, DeliveryOutcome), (String, String)> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: draft.recipient_id,
            title: draft.title,
            message: draft.message,
            severity: draft.severity,
            category: draft.category,
            read: false,
            created_at: self.clock.utc(),
            extra: draft.extra,
        };

        if let Err(err) = self.notifications.insert(&notification).await {
            warn!(
                recipient = %notification.user_id,
                error = %err,
                "failed to persist notification"
            );
            return Err((notification.user_id, err.to_string()));
        }

        let outcome = self
            .registry
            .send(&notification.user_id, &notification)
            .await;
        if outcome == DeliveryOutcome::Dropped {
            warn!(
                recipient = %notification.user_id,
                notification_id = %notification.id,
                "live push failed; notification stays persisted"
            );
        }
        Ok((notification, outcome))
    }
}

#[async_trait]
impl<D, N> NotificationCommand for NotificationFanoutService<D, N>
where
    D: RecipientDirectory + 'static,
    N: NotificationRepository + 'static,
{
    async fn dispatch(&self, trigger: NotificationTrigger) -> Result<DispatchReport, Error> {
        let drafts = match &trigger {
            NotificationTrigger::OrderStatusChanged(event) => self.order_drafts(event),
            NotificationTrigger::Promotion(promotion) => self.promotion_drafts(promotion).await?,
            NotificationTrigger::AdminActivity(activity) => self.admin_drafts(activity).await?,
        };

        let results: Vec<_> = stream::iter(drafts)
            .map(|draft| self.deliver(draft))
            .buffer_unordered(self.config.max_concurrent_dispatches.max(1))
            .collect()
            .await;

        let mut report = DispatchReport::default();
        for result in results {
            match result {
                Ok((notification, outcome)) => report.record_delivery(notification, outcome),
                Err((recipient_id, reason)) => report.record_failure(recipient_id, reason),
            }
        }

        info!(
            trigger = trigger.name(),
            created = report.created(),
            delivered = report.delivered,
            queued = report.queued,
            dropped = report.dropped,
            failed = report.failures.len(),
            "notification fanout finished"
        );
        Ok(report)
    }
}

/// Run `trigger` on a detached task so the caller does not wait for fanout.
///
/// The outcome is only logged; callers that need the report should await
/// [`NotificationCommand::dispatch`] directly.
pub fn spawn_dispatch(
    command: Arc<dyn NotificationCommand>,
    trigger: NotificationTrigger,
) -> JoinHandle<()> {
    let name = trigger.name();
    tokio::spawn(async move {
        if let Err(err) = command.dispatch(trigger).await {
            error!(trigger = name, error = %err, "background notification fanout failed");
        }
    })
}
