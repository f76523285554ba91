//! Port for resolving notification recipients.

use async_trait::async_trait;

use crate::domain::notifications::{Recipient, UserRole};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipient directory adapters.
    pub enum RecipientDirectoryError {
        /// The user store could not be reached.
        Connection { message: String } =>
            "recipient directory connection failed: {message}",
        /// The lookup failed while executing.
        Query { message: String } =>
            "recipient directory query failed: {message}",
    }
}

/// Filter over active (non-deleted) users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientFilter {
    /// Restrict to these roles; `None` selects every active user.
    pub roles: Option<Vec<UserRole>>,
    /// Maximum number of recipients to return.
    pub limit: usize,
}

impl RecipientFilter {
    /// Every active user, up to `limit`.
    pub fn everyone(limit: usize) -> Self {
        Self { roles: None, limit }
    }

    /// Active users holding an admin role, up to `limit`.
    pub fn admins(limit: usize) -> Self {
        Self {
            roles: Some(UserRole::ADMIN_ROLES.to_vec()),
            limit,
        }
    }

    /// Whether `role` passes the role restriction.
    pub fn accepts(&self, role: &UserRole) -> bool {
        self.roles
            .as_ref()
            .is_none_or(|roles| roles.contains(role))
    }
}

/// Lookup of users that should receive a broadcast.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Active users matching `filter`, in a stable order.
    async fn active_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RecipientDirectoryError>;
}

/// Fixture directory with no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipientDirectory;

#[async_trait]
impl RecipientDirectory for FixtureRecipientDirectory {
    async fn active_recipients(
        &self,
        _filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        Ok(Vec::new())
    }
}
