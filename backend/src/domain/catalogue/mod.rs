//! Catalogue and order records served by delta sync.
//!
//! [`StoredRecord`] is what the store hands back; [`SyncItem`] is what a sync
//! response carries. The two differ only for products, which are enriched into
//! a [`ProductView`] on the way out.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::sync::{EntityKind, SortOrder};

mod product_view;
mod records;


pub use product_view::{ProductEnrichment, ProductView};
pub use records::{CarBrand, CarModel, Category, Order, Product, ProductBrand};

/// A record of any synced entity type as read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    Product(Product),
    Category(Category),
    CarBrand(CarBrand),
    CarModel(CarModel),
    ProductBrand(ProductBrand),
    Order(Order),
}

impl StoredRecord {
    /// Entity type of the record.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Product(_) => EntityKind::Products,
            Self::Category(_) => EntityKind::Categories,
            Self::CarBrand(_) => EntityKind::CarBrands,
            Self::CarModel(_) => EntityKind::CarModels,
            Self::ProductBrand(_) => EntityKind::ProductBrands,
            Self::Order(_) => EntityKind::Orders,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Product(r) => &r.id,
            Self::Category(r) => &r.id,
            Self::CarBrand(r) => &r.id,
            Self::CarModel(r) => &r.id,
            Self::ProductBrand(r) => &r.id,
            Self::Order(r) => &r.id,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Product(r) => r.updated_at,
            Self::Category(r) => r.updated_at,
            Self::CarBrand(r) => r.updated_at,
            Self::CarModel(r) => r.updated_at,
            Self::ProductBrand(r) => r.updated_at,
            Self::Order(r) => r.updated_at,
        }
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Product(r) => r.deleted_at,
            Self::Category(r) => r.deleted_at,
            Self::CarBrand(r) => r.deleted_at,
            Self::CarModel(r) => r.deleted_at,
            Self::ProductBrand(r) => r.deleted_at,
            Self::Order(r) => r.deleted_at,
        }
    }

    /// Owning user for per-user collections (orders); `None` otherwise.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::Order(r) => Some(r.user_id.as_str()),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Product(r) => &r.name,
            Self::Category(r) => &r.name,
            Self::CarBrand(r) => &r.name,
            Self::CarModel(r) => &r.name,
            Self::ProductBrand(r) => &r.name,
            Self::Order(r) => &r.order_number,
        }
    }

    fn sort_order(&self) -> i32 {
        match self {
            Self::Category(r) => r.sort_order,
            _ => 0,
        }
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Product(r) => r.created_at,
            Self::Order(r) => Some(r.created_at),
            _ => None,
        }
    }

    /// Compare two records under `order`, breaking ties by ascending id.
    ///
    /// # Examples
    /// ```
    /// use std::cmp::Ordering;
    /// use catalog_backend::domain::{CarBrand, StoredRecord};
    /// use catalog_backend::domain::sync::SortOrder;
    /// use chrono::Utc;
    ///
    /// let brand = |id: &str, name: &str| StoredRecord::CarBrand(CarBrand {
    ///     id: id.into(),
    ///     name: name.into(),
    ///     name_ar: None,
    ///     logo: None,
    ///     updated_at: Utc::now(),
    ///     deleted_at: None,
    ///     attributes: Default::default(),
    /// });
    /// let kia = brand("b", "Kia");
    /// let audi = brand("a", "Audi");
    /// assert_eq!(audi.compare(&kia, SortOrder::NameAsc), Ordering::Less);
    /// ```
    pub fn compare(&self, other: &Self, order: SortOrder) -> Ordering {
        let primary = match order {
            SortOrder::UpdatedDesc => other.updated_at().cmp(&self.updated_at()),
            SortOrder::SortOrderThenName => self
                .sort_order()
                .cmp(&other.sort_order())
                .then_with(|| self.name().cmp(other.name())),
            SortOrder::NameAsc => self.name().cmp(other.name()),
            SortOrder::CreatedDesc => other.created_at().cmp(&self.created_at()),
            SortOrder::UpdatedAsc => self.updated_at().cmp(&other.updated_at()),
        };
        primary.then_with(|| self.id().cmp(other.id()))
    }
}

/// A record as it appears in a sync response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyncItem {
    Product(ProductView),
    Category(Category),
    CarBrand(CarBrand),
    CarModel(CarModel),
    ProductBrand(ProductBrand),
    Order(Order),
}

impl SyncItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Product(v) => &v.product.id,
            Self::Category(r) => &r.id,
            Self::CarBrand(r) => &r.id,
            Self::CarModel(r) => &r.id,
            Self::ProductBrand(r) => &r.id,
            Self::Order(r) => &r.id,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Product(v) => v.product.updated_at,
            Self::Category(r) => r.updated_at,
            Self::CarBrand(r) => r.updated_at,
            Self::CarModel(r) => r.updated_at,
            Self::ProductBrand(r) => r.updated_at,
            Self::Order(r) => r.updated_at,
        }
    }
}

impl From<StoredRecord> for SyncItem {
    /// Convert without enrichment. Products get an empty enrichment apart
    /// from the compatible model count.
    fn from(record: StoredRecord) -> Self {
        match record {
            StoredRecord::Product(product) => {
                let enrichment = ProductEnrichment::from_related(&product, None, None, None);
                Self::Product(ProductView::new(product, enrichment))
            }
            StoredRecord::Category(r) => Self::Category(r),
            StoredRecord::CarBrand(r) => Self::CarBrand(r),
            StoredRecord::CarModel(r) => Self::CarModel(r),
            StoredRecord::ProductBrand(r) => Self::ProductBrand(r),
            StoredRecord::Order(r) => Self::Order(r),
        }
    }
}
