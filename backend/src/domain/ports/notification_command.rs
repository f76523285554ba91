//! Driving port for notification fanout.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::notifications::{DispatchReport, NotificationTrigger};

/// Driving port that turns a business event into per-recipient notifications.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), catalog_backend::domain::Error> {
/// use catalog_backend::domain::notifications::{AdminActivity, NotificationTrigger};
/// use catalog_backend::domain::ports::{FixtureNotificationCommand, NotificationCommand};
///
/// let trigger = NotificationTrigger::from(AdminActivity::new_user_registered("a@b.test", None));
/// let report = FixtureNotificationCommand.dispatch(trigger).await?;
/// assert_eq!(report.created(), 0);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Create, persist, and push notifications for `trigger`.
    ///
    /// Per-recipient failures are reported in the returned
    /// [`DispatchReport`]; only a failure to resolve recipients is an error.
    async fn dispatch(&self, trigger: NotificationTrigger) -> Result<DispatchReport, Error>;
}

/// Fixture command that creates nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationCommand;

#[async_trait]
impl NotificationCommand for FixtureNotificationCommand {
    async fn dispatch(&self, _trigger: NotificationTrigger) -> Result<DispatchReport, Error> {
        Ok(DispatchReport::default())
    }
}
