//! PostgreSQL-backed delta sync read adapter.
//!
//! Every synced table shares the soft-delete columns, so the change and
//! tombstone queries are stamped out per table by the macros below. Only
//! orders carry an owner column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    RecordQuery, SyncRepository, SyncRepositoryError, Tombstone, TombstoneQuery,
};
use crate::domain::sync::{EntityKind, SortOrder};
use crate::domain::{CarBrand, CarModel, ProductBrand, StoredRecord};

use super::error_mapping::{map_diesel_error, map_pool_error, sql_limit};
use super::models::{
    CarBrandRow, CarModelRow, CategoryRow, OrderRow, ProductBrandRow, ProductRow,
};
use super::pool::DbPool;
use super::schema::{car_brands, car_models, categories, orders, product_brands, products};

/// Diesel-backed implementation of the [`SyncRepository`] port.
#[derive(Clone)]
pub struct DieselSyncRepository {
    pool: DbPool,
}

impl DieselSyncRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/catalog")).await?;
    /// let repo = DieselSyncRepository::new(pool);
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Build the paged statement for live rows changed after the query checkpoint.
///
/// `name`, `sort_order` and `created` name the orderings used for
/// [`SortOrder::NameAsc`], [`SortOrder::SortOrderThenName`] and
/// [`SortOrder::CreatedDesc`]; tables without such columns pass their nearest
/// equivalent.
macro_rules! changed_statement {
    (
        $query:expr, $table:ident, $row:ty,
        name = $name:expr, sort_order = $sort_order:expr, created = $created:expr
        $(, owner = $owner:expr)?
    ) => {{
        let statement = $table::table
            .filter($table::deleted_at.is_null())
            .select(<$row>::as_select())
            .into_boxed();
        let statement = match $query.updated_after {
            Some(after) => statement.filter($table::updated_at.gt(after)),
            None => statement,
        };
        $(
            let statement = match $query.owner.clone() {
                Some(owner) => statement.filter($owner.eq(owner)),
                None => statement,
            };
        )?
        let statement = match $query.sort {
            SortOrder::UpdatedDesc => statement.order_by($table::updated_at.desc()),
            SortOrder::UpdatedAsc => statement.order_by($table::updated_at.asc()),
            SortOrder::SortOrderThenName => statement.order_by($sort_order),
            SortOrder::NameAsc => statement.order_by($name),
            SortOrder::CreatedDesc => statement.order_by($created),
        };
        statement
            .then_order_by($table::id.asc())
            .limit(sql_limit($query.limit))
    }};
}

/// Run [`changed_statement!`] for one table and wrap the rows.
macro_rules! load_changed {
    ($conn:expr, $query:expr, $table:ident, $row:ty, $variant:ident, $($ordering:tt)*) => {{
        let rows: Vec<$row> = changed_statement!($query, $table, $row, $($ordering)*)
            .load($conn)
            .await
            .map_err(|err| map_diesel_error(err, concat!("load changed ", stringify!($table))))?;
        rows.into_iter()
            .map(|row| StoredRecord::$variant(row.into()))
            .collect::<Vec<_>>()
    }};
}

/// Load `(id, deleted_at)` pairs deleted after the query checkpoint.
macro_rules! load_tombstones {
    ($conn:expr, $query:expr, $table:ident $(, owner = $owner:expr)?) => {{
        let statement = $table::table
            .filter($table::deleted_at.gt($query.deleted_after))
            .select(($table::id, $table::deleted_at))
            .into_boxed();
        $(
            let statement = match $query.owner.clone() {
                Some(owner) => statement.filter($owner.eq(owner)),
                None => statement,
            };
        )?
        let rows: Vec<(String, Option<DateTime<Utc>>)> = statement
            .order_by($table::deleted_at.asc())
            .then_order_by($table::id.asc())
            .limit(sql_limit($query.limit))
            .load($conn)
            .await
            .map_err(|err| map_diesel_error(err, concat!("load tombstones ", stringify!($table))))?;
        rows
    }};
}

fn into_tombstones(rows: Vec<(String, Option<DateTime<Utc>>)>) -> Vec<Tombstone> {
    rows.into_iter()
        .filter_map(|(id, deleted_at)| deleted_at.map(|deleted_at| Tombstone { id, deleted_at }))
        .collect()
}

#[async_trait]
impl SyncRepository for DieselSyncRepository {
    async fn changed_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<StoredRecord>, SyncRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut conn;
        let records = match query.kind {
            EntityKind::Products => load_changed!(
                conn, query, products, ProductRow, Product,
                name = products::name.asc(),
                sort_order = products::name.asc(),
                created = products::created_at.desc()
            ),
            EntityKind::Categories => load_changed!(
                conn, query, categories, CategoryRow, Category,
                name = categories::name.asc(),
                sort_order = (categories::sort_order.asc(), categories::name.asc()),
                created = categories::updated_at.desc()
            ),
            EntityKind::CarBrands => load_changed!(
                conn, query, car_brands, CarBrandRow, CarBrand,
                name = car_brands::name.asc(),
                sort_order = car_brands::name.asc(),
                created = car_brands::updated_at.desc()
            ),
            EntityKind::CarModels => load_changed!(
                conn, query, car_models, CarModelRow, CarModel,
                name = car_models::name.asc(),
                sort_order = car_models::name.asc(),
                created = car_models::updated_at.desc()
            ),
            EntityKind::ProductBrands => load_changed!(
                conn, query, product_brands, ProductBrandRow, ProductBrand,
                name = product_brands::name.asc(),
                sort_order = product_brands::name.asc(),
                created = product_brands::updated_at.desc()
            ),
            EntityKind::Orders => load_changed!(
                conn, query, orders, OrderRow, Order,
                name = orders::order_number.asc(),
                sort_order = orders::order_number.asc(),
                created = orders::created_at.desc(),
                owner = orders::user_id
            ),
        };
        Ok(records)
    }

    async fn tombstones(
        &self,
        query: &TombstoneQuery,
    ) -> Result<Vec<Tombstone>, SyncRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut conn;
        let rows = match query.kind {
            EntityKind::Products => load_tombstones!(conn, query, products),
            EntityKind::Categories => load_tombstones!(conn, query, categories),
            EntityKind::CarBrands => load_tombstones!(conn, query, car_brands),
            EntityKind::CarModels => load_tombstones!(conn, query, car_models),
            EntityKind::ProductBrands => load_tombstones!(conn, query, product_brands),
            EntityKind::Orders => {
                load_tombstones!(conn, query, orders, owner = orders::user_id)
            }
        };
        Ok(into_tombstones(rows))
    }

    async fn product_brands_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<ProductBrand>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductBrandRow> = product_brands::table
            .filter(product_brands::id.eq_any(ids))
            .select(ProductBrandRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load product brands by id"))?;
        Ok(rows.into_iter().map(ProductBrand::from).collect())
    }

    async fn car_models_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<CarModel>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CarModelRow> = car_models::table
            .filter(car_models::id.eq_any(ids))
            .select(CarModelRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load car models by id"))?;
        Ok(rows.into_iter().map(CarModel::from).collect())
    }

    async fn car_brands_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<CarBrand>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CarBrandRow> = car_brands::table
            .filter(car_brands::id.eq_any(ids))
            .select(CarBrandRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load car brands by id"))?;
        Ok(rows.into_iter().map(CarBrand::from).collect())
    }
}
