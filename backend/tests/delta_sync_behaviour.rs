//! Behavioural tests for delta sync over the in-memory store.

mod support;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rstest::{fixture, rstest};

use catalog_backend::domain::ports::{CombinedDeltaRequest, DeltaSyncQuery, EntityDeltaRequest};
use catalog_backend::domain::sync::{DeltaSyncService, EntityKind, SyncCheckpoint};
use catalog_backend::domain::{
    CarBrand, CarModel, Category, Order, Product, ProductBrand, StoredRecord, SyncItem,
};
use catalog_backend::outbound::memory::InMemoryCatalogueStore;
use support::{at, frozen_clock};

fn car_brand(id: &str, name: &str, updated: DateTime<Utc>) -> CarBrand {
    CarBrand {
        id: id.to_owned(),
        name: name.to_owned(),
        name_ar: None,
        logo: None,
        updated_at: updated,
        deleted_at: None,
        attributes: Default::default(),
    }
}

fn deleted_brand(id: &str, deleted: DateTime<Utc>) -> StoredRecord {
    StoredRecord::CarBrand(CarBrand {
        deleted_at: Some(deleted),
        ..car_brand(id, id, deleted)
    })
}

fn order(id: &str, user_id: &str, created: DateTime<Utc>) -> StoredRecord {
    StoredRecord::Order(Order {
        id: id.to_owned(),
        order_number: format!("ORD-{id}"),
        user_id: user_id.to_owned(),
        status: "pending".to_owned(),
        total: Some(120.0),
        created_at: created,
        updated_at: created,
        deleted_at: None,
        attributes: Default::default(),
    })
}

fn checkpoint(instant: DateTime<Utc>) -> Option<String> {
    Some(SyncCheckpoint::new(instant).to_string())
}

fn ids(items: &[SyncItem]) -> Vec<&str> {
    items.iter().map(SyncItem::id).collect()
}

#[fixture]
fn store() -> Arc<InMemoryCatalogueStore> {
    let store = InMemoryCatalogueStore::new();
    store.upsert_records([
        StoredRecord::CarBrand(car_brand("toyota", "Toyota", at(2))),
        StoredRecord::CarBrand(car_brand("bmw", "BMW", at(5))),
        StoredRecord::CarBrand(car_brand("audi", "Audi", at(6))),
        deleted_brand("kia", at(4)),
        deleted_brand("lada", at(1)),
        StoredRecord::CarModel(CarModel {
            id: "corolla".to_owned(),
            brand_id: Some("toyota".to_owned()),
            name: "Corolla".to_owned(),
            name_ar: Some("كورولا".to_owned()),
            year_start: Some(2015),
            year_end: Some(2022),
            updated_at: at(1),
            deleted_at: None,
            attributes: Default::default(),
        }),
        StoredRecord::ProductBrand(ProductBrand {
            id: "bosch".to_owned(),
            name: "Bosch".to_owned(),
            name_ar: None,
            country_of_origin: Some("Germany".to_owned()),
            country_of_origin_ar: Some("ألمانيا".to_owned()),
            logo: None,
            updated_at: at(1),
            deleted_at: None,
            attributes: Default::default(),
        }),
        StoredRecord::Product(Product {
            id: "filter".to_owned(),
            name: "Oil filter".to_owned(),
            name_ar: None,
            sku: Some("OF-1".to_owned()),
            price: Some(9.5),
            category_id: Some("engine".to_owned()),
            product_brand_id: Some("bosch".to_owned()),
            car_model_ids: vec!["corolla".to_owned()],
            created_at: Some(at(1)),
            updated_at: at(3),
            deleted_at: None,
            attributes: Default::default(),
        }),
        StoredRecord::Category(Category {
            id: "engine".to_owned(),
            name: "Engine".to_owned(),
            name_ar: None,
            parent_id: None,
            sort_order: 1,
            updated_at: at(1),
            deleted_at: None,
            attributes: Default::default(),
        }),
        order("o1", "u1", at(1)),
        order("o2", "u2", at(2)),
        order("o3", "u1", at(3)),
    ]);
    Arc::new(store)
}

fn service(store: Arc<InMemoryCatalogueStore>) -> DeltaSyncService<InMemoryCatalogueStore> {
    DeltaSyncService::new(store, frozen_clock(at(12)))
}

#[rstest]
#[tokio::test]
async fn full_sync_returns_live_records_in_name_order(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .entity_delta(EntityDeltaRequest::new(EntityKind::CarBrands))
        .await
        .expect("delta succeeds");

    assert!(!delta.is_delta);
    assert_eq!(ids(&delta.changes.items), ["audi", "bmw", "toyota"]);
    assert!(delta.changes.deleted_ids.is_empty());
    assert!(!delta.changes.has_more);
    assert_eq!(delta.server_time, at(12));
}

#[rstest]
#[tokio::test]
async fn delta_returns_changes_and_deletions_after_checkpoint(
    store: Arc<InMemoryCatalogueStore>,
) {
    let delta = service(store)
        .entity_delta(EntityDeltaRequest {
            last_sync: Some("2024-05-01T03:00:00Z".to_owned()),
            ..EntityDeltaRequest::new(EntityKind::CarBrands)
        })
        .await
        .expect("delta succeeds");

    assert!(delta.is_delta);
    assert_eq!(ids(&delta.changes.items), ["audi", "bmw"]);
    assert_eq!(delta.changes.deleted_ids, ["kia"]);
}

#[rstest]
#[tokio::test]
async fn small_limit_truncates_and_flags_more(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .entity_delta(EntityDeltaRequest {
            limit: Some(2),
            ..EntityDeltaRequest::new(EntityKind::CarBrands)
        })
        .await
        .expect("delta succeeds");

    assert_eq!(delta.changes.total(), 2);
    assert!(delta.changes.has_more);
}

#[rstest]
#[tokio::test]
async fn products_carry_brand_and_compatibility_details(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .entity_delta(EntityDeltaRequest::new(EntityKind::Products))
        .await
        .expect("delta succeeds");

    let [SyncItem::Product(view)] = delta.changes.items.as_slice() else {
        panic!("expected one product, got {:?}", delta.changes.items);
    };
    assert_eq!(view.enrichment.product_brand_name.as_deref(), Some("Bosch"));
    assert_eq!(
        view.enrichment.manufacturer_country.as_deref(),
        Some("Germany")
    );
    assert_eq!(view.enrichment.compatible_car_model.as_deref(), Some("Corolla"));
    assert_eq!(view.enrichment.compatible_car_brand.as_deref(), Some("Toyota"));
    assert_eq!(view.enrichment.compatible_car_year_from, Some(2015));
    assert_eq!(view.enrichment.compatible_car_models_count, 1);
}

#[rstest]
#[tokio::test]
async fn orders_are_scoped_to_their_owner_newest_first(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .entity_delta(EntityDeltaRequest {
            owner: Some("u1".to_owned()),
            ..EntityDeltaRequest::new(EntityKind::Orders)
        })
        .await
        .expect("delta succeeds");

    assert_eq!(ids(&delta.changes.items), ["o3", "o1"]);
}

#[rstest]
#[tokio::test]
async fn combined_delta_defaults_to_catalogue_tables(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .combined_delta(CombinedDeltaRequest::default())
        .await
        .expect("combined delta succeeds");

    let kinds: Vec<_> = delta.data.keys().copied().collect();
    assert_eq!(kinds, EntityKind::DEFAULT_COMBINED);
    assert!(delta.failed_tables.is_empty());
    assert!(!delta.is_delta);
    assert_eq!(delta.data[&EntityKind::Categories].total(), 1);
}

#[rstest]
#[tokio::test]
async fn combined_delta_honours_requested_tables(store: Arc<InMemoryCatalogueStore>) {
    let delta = service(store)
        .combined_delta(CombinedDeltaRequest {
            last_sync: Some("2024-05-01T02:30:00Z".to_owned()),
            tables: Some("orders, car-brands".to_owned()),
            owner: Some("u1".to_owned()),
            ..CombinedDeltaRequest::default()
        })
        .await
        .expect("combined delta succeeds");

    assert!(delta.is_delta);
    let kinds: Vec<_> = delta.data.keys().copied().collect();
    assert_eq!(kinds, [EntityKind::CarBrands, EntityKind::Orders]);
    assert_eq!(ids(&delta.data[&EntityKind::Orders].items), ["o3"]);
    assert_eq!(delta.data[&EntityKind::CarBrands].deleted_ids, ["kia"]);
}

#[tokio::test]
async fn truncated_page_resumes_from_its_server_time() {
    let store = InMemoryCatalogueStore::new();
    store.upsert_records([
        StoredRecord::CarBrand(car_brand("audi", "Audi", at(2))),
        StoredRecord::CarBrand(car_brand("bmw", "BMW", at(3))),
        StoredRecord::CarBrand(car_brand("toyota", "Toyota", at(4))),
    ]);
    let service = service(Arc::new(store));
    let page = |last_sync: Option<String>| EntityDeltaRequest {
        last_sync,
        limit: Some(2),
        ..EntityDeltaRequest::new(EntityKind::CarBrands)
    };

    let first = service
        .entity_delta(page(checkpoint(at(1))))
        .await
        .expect("first page succeeds");
    assert_eq!(ids(&first.changes.items), ["audi", "bmw"]);
    assert!(first.changes.has_more);
    assert_eq!(first.server_time, at(3));

    let second = service
        .entity_delta(page(checkpoint(first.server_time)))
        .await
        .expect("second page succeeds");
    assert_eq!(ids(&second.changes.items), ["toyota"]);
    assert!(!second.changes.has_more);
    assert_eq!(second.server_time, at(12));
}

#[rstest]
#[tokio::test]
async fn repeating_a_sync_returns_the_same_delta(store: Arc<InMemoryCatalogueStore>) {
    let service = service(store);
    let request = CombinedDeltaRequest {
        last_sync: checkpoint(at(2)),
        tables: Some("car_brands,products,orders".to_owned()),
        owner: Some("u1".to_owned()),
        ..CombinedDeltaRequest::default()
    };

    let first = service
        .combined_delta(request.clone())
        .await
        .expect("first sync succeeds");
    let second = service
        .combined_delta(request)
        .await
        .expect("second sync succeeds");
    assert_eq!(first, second);
    assert_eq!(ids(&first.data[&EntityKind::CarBrands].items), ["audi", "bmw"]);
    assert_eq!(first.data[&EntityKind::CarBrands].deleted_ids, ["kia"]);
}

#[tokio::test]
async fn mass_deletion_is_delivered_in_ceiling_sized_batches() {
    let ceiling = EntityKind::CarBrands.default_policy().tombstone_ceiling;
    let deleted_at = |n: i64| at(2) + Duration::seconds(n);
    let store = InMemoryCatalogueStore::new();
    store.upsert_records((0..500).map(|n| deleted_brand(&format!("gone-{n:03}"), deleted_at(n))));
    let service = service(Arc::new(store));
    let request = |last_sync| EntityDeltaRequest {
        last_sync,
        ..EntityDeltaRequest::new(EntityKind::CarBrands)
    };

    let first = service
        .entity_delta(request(checkpoint(at(1))))
        .await
        .expect("delta succeeds");
    assert_eq!(ceiling, 100);
    assert_eq!(first.changes.deleted_ids.len(), 100);
    assert_eq!(first.changes.deleted_ids.first().map(String::as_str), Some("gone-000"));
    assert_eq!(first.changes.deleted_ids.last().map(String::as_str), Some("gone-099"));
    assert_eq!(first.server_time, deleted_at(99));

    let second = service
        .entity_delta(request(checkpoint(first.server_time)))
        .await
        .expect("delta succeeds");
    assert_eq!(second.changes.deleted_ids.first().map(String::as_str), Some("gone-100"));
    assert_eq!(second.changes.deleted_ids.len(), 100);
}
