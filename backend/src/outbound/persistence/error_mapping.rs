//! Shared mapping from pool and Diesel failures onto port errors.
//!
//! Every repository port in this crate distinguishes an unreachable store
//! (`Connection`) from a failed statement (`Query`); [`StoreError`] lets one
//! pair of mapping functions serve all of them.

use tracing::debug;

use crate::domain::ports::{
    NotificationRepositoryError, RecipientDirectoryError, SyncRepositoryError,
};

use super::pool::PoolError;

/// Port error with connection and query variants.
pub(crate) trait StoreError {
    fn connection_failed(message: String) -> Self;
    fn query_failed(message: String) -> Self;
}

macro_rules! impl_store_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl StoreError for $error {
                fn connection_failed(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failed(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_store_error!(
    SyncRepositoryError,
    RecipientDirectoryError,
    NotificationRepositoryError,
);

/// Pool failures always mean the store is unreachable.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    E::connection_failed(message)
}

/// Map a Diesel failure, treating lost connections as connection errors.
pub(crate) fn map_diesel_error<E: StoreError>(error: diesel::result::Error, operation: &str) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(error = %error, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            E::connection_failed(format!("{operation}: database connection lost"))
        }
        DieselError::NotFound => E::query_failed(format!("{operation}: record not found")),
        DieselError::QueryBuilderError(_) => {
            E::query_failed(format!("{operation}: invalid query"))
        }
        DieselError::DeserializationError(_) => {
            E::query_failed(format!("{operation}: unreadable row"))
        }
        _ => E::query_failed(format!("{operation}: database error")),
    }
}

/// Convert a page size into a SQL `LIMIT`.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
