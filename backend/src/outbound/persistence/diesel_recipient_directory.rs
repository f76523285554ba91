//! PostgreSQL-backed recipient lookup over the users table.

use async_trait::async_trait;
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::notifications::Recipient;
use crate::domain::ports::{RecipientDirectory, RecipientDirectoryError, RecipientFilter};

use super::error_mapping::{map_diesel_error, map_pool_error, sql_limit};
use super::models::RecipientRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`RecipientDirectory`] port.
#[derive(Clone)]
pub struct DieselRecipientDirectory {
    pool: DbPool,
}

impl DieselRecipientDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

diesel::define_sql_function!(fn lower(value: Text) -> Text);
diesel::define_sql_function!(fn btrim(value: Text) -> Text);

type RecipientQuery = users::BoxedQuery<'static, Pg, SqlTypeOf<AsSelect<RecipientRow, Pg>>>;

/// Normalized role names matching the filter, or `None` for no restriction.
///
/// Stored roles are compared trimmed and lower-cased, matching how
/// [`crate::domain::notifications::UserRole`] parses them.
fn role_names(filter: &RecipientFilter) -> Option<Vec<String>> {
    filter.roles.as_ref().map(|roles| {
        roles
            .iter()
            .map(|role| role.as_str().trim().to_lowercase())
            .collect()
    })
}

fn recipients_query(filter: &RecipientFilter) -> RecipientQuery {
    let statement = users::table
        .filter(users::deleted_at.is_null())
        .select(RecipientRow::as_select())
        .into_boxed();
    let statement = match role_names(filter) {
        Some(names) => statement.filter(lower(btrim(users::role)).eq_any(names)),
        None => statement,
    };
    statement
        .order_by(users::id.asc())
        .limit(sql_limit(filter.limit))
}

#[async_trait]
impl RecipientDirectory for DieselRecipientDirectory {
    async fn active_recipients(
        &self,
        filter: &RecipientFilter,
    ) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecipientRow> = recipients_query(filter)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load recipients"))?;
        Ok(rows.into_iter().map(Recipient::from).collect())
    }
}
