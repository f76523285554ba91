//! Change-set planning: which live records a client needs.
//!
//! The planner asks the store for one row more than the page size so it can
//! tell a full page from a truncated one, then enriches products with display
//! data from related collections using one batched lookup per collection.
//!
//! Pages are cut in `updated_at` order. A truncated page reports the instant
//! of its last delivered row so the next sync resumes exactly after it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::ports::{RecordQuery, SyncRepository, SyncRepositoryError};
use crate::domain::{
    CarBrand, CarModel, Product, ProductBrand, ProductEnrichment, ProductView, StoredRecord,
    SyncItem,
};

use super::checkpoint::SyncCheckpoint;
use super::entity::{EntityKind, EntityPolicy, SortOrder};

/// Parameters for one planning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetRequest {
    pub kind: EntityKind,
    pub checkpoint: Option<SyncCheckpoint>,
    /// Page size, already clamped by the entity policy.
    pub limit: usize,
    pub owner: Option<String>,
}

/// Ordered records for one entity type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub items: Vec<SyncItem>,
    /// Records beyond `limit` were left out.
    pub has_more: bool,
    /// Update instant of the last delivered record when `has_more` is set.
    pub resume_after: Option<DateTime<Utc>>,
}

/// Builds change sets from a [`SyncRepository`].
#[derive(Clone)]
pub struct ChangeSetPlanner<R> {
    repository: Arc<R>,
}

impl<R> ChangeSetPlanner<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> ChangeSetPlanner<R>
where
    R: SyncRepository,
{
    /// Plan the change set described by `request` under `policy`.
    pub async fn plan(
        &self,
        request: &ChangeSetRequest,
        policy: &EntityPolicy,
    ) -> Result<ChangeSet, SyncRepositoryError> {
        let limit = request.limit.max(1);
        let query = RecordQuery {
            kind: request.kind,
            updated_after: request.checkpoint.map(SyncCheckpoint::instant),
            owner: request.owner.clone(),
            sort: SortOrder::UpdatedAsc,
            limit: limit.saturating_add(1),
        };

        let mut records = self.repository.changed_records(&query).await?;
        // Live records of the requested type only.
        records.retain(|record| record.kind() == request.kind && record.deleted_at().is_none());
        records.sort_by(|a, b| a.compare(b, SortOrder::UpdatedAsc));

        let resume_after = cut_page(&mut records, limit, StoredRecord::updated_at);
        let has_more = resume_after.is_some();
        if has_more {
            warn!(
                entity = %request.kind,
                limit,
                delivered = records.len(),
                "change set truncated; client must sync again to receive the rest"
            );
        }
        records.sort_by(|a, b| a.compare(b, policy.sort));

        let items = match request.kind {
            EntityKind::Products => self.enrich_products(records).await?,
            _ => records.into_iter().map(SyncItem::from).collect(),
        };

        Ok(ChangeSet {
            items,
            has_more,
            resume_after,
        })
    }

    async fn enrich_products(
        &self,
        records: Vec<StoredRecord>,
    ) -> Result<Vec<SyncItem>, SyncRepositoryError> {
        let products: Vec<Product> = records
            .into_iter()
            .filter_map(|record| match record {
                StoredRecord::Product(product) => Some(product),
                _ => None,
            })
            .collect();
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let brand_ids = distinct(products.iter().filter_map(|p| p.product_brand_id.as_deref()));
        let model_ids = distinct(
            products
                .iter()
                .filter_map(|p| p.car_model_ids.first().map(String::as_str)),
        );

        let brands = self.product_brands(&brand_ids).await?;
        let models = self.car_models(&model_ids).await?;
        let car_brand_ids = distinct(models.values().filter_map(|m| m.brand_id.as_deref()));
        let car_brands = self.car_brands(&car_brand_ids).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let brand = product
                    .product_brand_id
                    .as_deref()
                    .and_then(|id| brands.get(id));
                let model = product
                    .car_model_ids
                    .first()
                    .and_then(|id| models.get(id.as_str()));
                let model_brand = model
                    .and_then(|m| m.brand_id.as_deref())
                    .and_then(|id| car_brands.get(id));
                let enrichment = ProductEnrichment::from_related(&product, brand, model, model_brand);
                SyncItem::Product(ProductView::new(product, enrichment))
            })
            .collect())
    }

    async fn product_brands(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ProductBrand>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let brands = self.repository.product_brands_by_ids(ids).await?;
        Ok(brands.into_iter().map(|b| (b.id.clone(), b)).collect())
    }

    async fn car_models(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CarModel>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = self.repository.car_models_by_ids(ids).await?;
        Ok(models.into_iter().map(|m| (m.id.clone(), m)).collect())
    }

    async fn car_brands(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CarBrand>, SyncRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let brands = self.repository.car_brands_by_ids(ids).await?;
        Ok(brands.into_iter().map(|b| (b.id.clone(), b)).collect())
    }
}

/// Cut `rows`, sorted by `stamp` ascending, down to at most `limit` rows.
///
/// Returns the stamp of the last kept row when rows were dropped. Rows sharing
/// the stamp of the first dropped row are held back with it, so resuming
/// strictly after the returned stamp loses nothing. A page made entirely of
/// one instant cannot be split that way and is kept whole.
pub(super) fn cut_page<T>(
    rows: &mut Vec<T>,
    limit: usize,
    stamp: impl Fn(&T) -> DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let boundary = stamp(rows.get(limit)?);
    rows.truncate(limit);
    if rows.iter().any(|row| stamp(row) < boundary) {
        rows.retain(|row| stamp(row) < boundary);
    } else {
        warn!(
            rows = rows.len(),
            %boundary,
            "page holds a single instant; rows sharing it beyond the page are skipped"
        );
    }
    rows.iter().map(&stamp).max()
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::domain::ports::MockSyncRepository;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn category(id: &str) -> StoredRecord {
        category_at(id, 2)
    }

    fn category_at(id: &str, hour: u32) -> StoredRecord {
        StoredRecord::Category(Category {
            id: id.to_owned(),
            name: id.to_uppercase(),
            name_ar: None,
            parent_id: None,
            sort_order: 0,
            updated_at: at(hour),
            deleted_at: None,
            attributes: Default::default(),
        })
    }

    fn product(id: &str, brand: Option<&str>, models: &[&str]) -> StoredRecord {
        StoredRecord::Product(Product {
            id: id.to_owned(),
            name: format!("part {id}"),
            name_ar: None,
            sku: None,
            price: None,
            category_id: None,
            product_brand_id: brand.map(str::to_owned),
            car_model_ids: models.iter().map(|m| (*m).to_owned()).collect(),
            created_at: None,
            updated_at: at(3),
            deleted_at: None,
            attributes: Default::default(),
        })
    }

    fn request(kind: EntityKind, limit: usize) -> ChangeSetRequest {
        ChangeSetRequest {
            kind,
            checkpoint: Some(SyncCheckpoint::new(at(1))),
            limit,
            owner: None,
        }
    }

    #[tokio::test]
    async fn requests_one_extra_row_and_flags_truncation() {
        let mut repo = MockSyncRepository::new();
        repo.expect_changed_records()
            .withf(|query| {
                query.limit == 3
                    && query.updated_after == Some(at(1))
                    && query.sort == SortOrder::UpdatedAsc
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    category_at("c", 4),
                    category_at("a", 2),
                    category_at("b", 3),
                ])
            });
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::Categories.default_policy();

        let change_set = planner
            .plan(&request(EntityKind::Categories, 2), &policy)
            .await
            .expect("plan succeeds");

        let ids: Vec<_> = change_set.items.iter().map(SyncItem::id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(change_set.has_more);
        assert_eq!(change_set.resume_after, Some(at(3)));
    }

    #[tokio::test]
    async fn truncated_page_holds_back_rows_sharing_the_cut_instant() {
        let mut repo = MockSyncRepository::new();
        repo.expect_changed_records().returning(|_| {
            Ok(vec![
                category_at("a", 2),
                category_at("b", 3),
                category_at("c", 3),
            ])
        });
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::Categories.default_policy();

        let change_set = planner
            .plan(&request(EntityKind::Categories, 2), &policy)
            .await
            .expect("plan succeeds");

        let ids: Vec<_> = change_set.items.iter().map(SyncItem::id).collect();
        assert_eq!(ids, ["a"]);
        assert!(change_set.has_more);
        assert_eq!(change_set.resume_after, Some(at(2)));
    }

    #[tokio::test]
    async fn truncated_page_is_returned_in_display_order() {
        let mut repo = MockSyncRepository::new();
        repo.expect_changed_records().returning(|_| {
            Ok(vec![
                StoredRecord::CarBrand(CarBrand {
                    id: "zz".to_owned(),
                    name: "Zastava".to_owned(),
                    name_ar: None,
                    logo: None,
                    updated_at: at(2),
                    deleted_at: None,
                    attributes: Default::default(),
                }),
                StoredRecord::CarBrand(CarBrand {
                    id: "au".to_owned(),
                    name: "Audi".to_owned(),
                    name_ar: None,
                    logo: None,
                    updated_at: at(3),
                    deleted_at: None,
                    attributes: Default::default(),
                }),
                StoredRecord::CarBrand(CarBrand {
                    id: "bm".to_owned(),
                    name: "BMW".to_owned(),
                    name_ar: None,
                    logo: None,
                    updated_at: at(4),
                    deleted_at: None,
                    attributes: Default::default(),
                }),
            ])
        });
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::CarBrands.default_policy();

        let change_set = planner
            .plan(&request(EntityKind::CarBrands, 2), &policy)
            .await
            .expect("plan succeeds");

        let ids: Vec<_> = change_set.items.iter().map(SyncItem::id).collect();
        assert_eq!(ids, ["au", "zz"]);
        assert_eq!(change_set.resume_after, Some(at(3)));
    }

    #[rstest]
    #[case(&[1, 2, 3], 3, None, &[1, 2, 3])]
    #[case(&[1, 2, 3, 4], 3, Some(3), &[1, 2, 3])]
    #[case(&[1, 2, 2, 2], 3, Some(1), &[1])]
    #[case(&[2, 2, 2, 2], 3, Some(2), &[2, 2, 2])]
    fn cut_page_keeps_whole_instants(
        #[case] hours: &[u32],
        #[case] limit: usize,
        #[case] expected_bound: Option<u32>,
        #[case] kept: &[u32],
    ) {
        let mut rows: Vec<DateTime<Utc>> = hours.iter().map(|h| at(*h)).collect();
        let bound = cut_page(&mut rows, limit, |row| *row);
        assert_eq!(bound, expected_bound.map(at));
        assert_eq!(rows, kept.iter().map(|h| at(*h)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn full_page_without_extra_row_is_not_truncated() {
        let mut repo = MockSyncRepository::new();
        repo.expect_changed_records()
            .returning(|_| Ok(vec![category("a"), category("b")]));
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::Categories.default_policy();

        let change_set = planner
            .plan(&request(EntityKind::Categories, 2), &policy)
            .await
            .expect("plan succeeds");
        assert!(!change_set.has_more);
        assert_eq!(change_set.items.len(), 2);
    }

    #[tokio::test]
    async fn products_are_enriched_with_batched_lookups() {
        let mut repo = MockSyncRepository::new();
        repo.expect_changed_records().returning(|_| {
            Ok(vec![
                product("p1", Some("pb1"), &["m1", "m2"]),
                product("p2", Some("pb1"), &[]),
                product("p3", Some("missing"), &["m9"]),
            ])
        });
        repo.expect_product_brands_by_ids()
            .withf(|ids| ids.to_vec() == ["missing".to_owned(), "pb1".to_owned()])
            .times(1)
            .returning(|_| {
                Ok(vec![ProductBrand {
                    id: "pb1".to_owned(),
                    name: "Bosch".to_owned(),
                    name_ar: Some("بوش".to_owned()),
                    country_of_origin: Some("Germany".to_owned()),
                    country_of_origin_ar: None,
                    logo: None,
                    updated_at: at(1),
                    deleted_at: None,
                    attributes: Default::default(),
                }])
            });
        repo.expect_car_models_by_ids()
            .withf(|ids| ids.to_vec() == ["m1".to_owned(), "m9".to_owned()])
            .times(1)
            .returning(|_| {
                Ok(vec![CarModel {
                    id: "m1".to_owned(),
                    brand_id: Some("cb1".to_owned()),
                    name: "Corolla".to_owned(),
                    name_ar: None,
                    year_start: Some(2015),
                    year_end: Some(2020),
                    updated_at: at(1),
                    deleted_at: None,
                    attributes: Default::default(),
                }])
            });
        repo.expect_car_brands_by_ids()
            .withf(|ids| ids.to_vec() == ["cb1".to_owned()])
            .times(1)
            .returning(|_| {
                Ok(vec![CarBrand {
                    id: "cb1".to_owned(),
                    name: "Toyota".to_owned(),
                    name_ar: None,
                    logo: None,
                    updated_at: at(1),
                    deleted_at: None,
                    attributes: Default::default(),
                }])
            });
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::Products.default_policy();

        let change_set = planner
            .plan(&request(EntityKind::Products, 10), &policy)
            .await
            .expect("plan succeeds");

        let views: Vec<_> = change_set
            .items
            .into_iter()
            .filter_map(|item| match item {
                SyncItem::Product(view) => Some(view),
                _ => None,
            })
            .collect();
        assert_eq!(views.len(), 3);

        let first = &views[0].enrichment;
        assert_eq!(first.product_brand_name.as_deref(), Some("Bosch"));
        assert_eq!(first.manufacturer_country.as_deref(), Some("Germany"));
        assert_eq!(first.compatible_car_model.as_deref(), Some("Corolla"));
        assert_eq!(first.compatible_car_brand.as_deref(), Some("Toyota"));
        assert_eq!(first.compatible_car_year_from, Some(2015));
        assert_eq!(first.compatible_car_models_count, 2);

        let second = &views[1].enrichment;
        assert_eq!(second.compatible_car_model, None);
        assert_eq!(second.compatible_car_models_count, 0);

        let third = &views[2].enrichment;
        assert_eq!(third.product_brand_name, None);
        assert_eq!(third.compatible_car_model, None);
    }

    #[rstest]
    #[case(SyncRepositoryError::connection("down"))]
    #[case(SyncRepositoryError::query("bad filter"))]
    #[tokio::test]
    async fn repository_errors_propagate(#[case] error: SyncRepositoryError) {
        let mut repo = MockSyncRepository::new();
        let returned = error.clone();
        repo.expect_changed_records()
            .returning(move |_| Err(returned.clone()));
        let planner = ChangeSetPlanner::new(Arc::new(repo));
        let policy = EntityKind::CarBrands.default_policy();

        let result = planner.plan(&request(EntityKind::CarBrands, 5), &policy).await;
        assert_eq!(result, Err(error));
    }
}
