//! Product enriched with display data from related collections.

use serde::Serialize;

use super::{CarBrand, CarModel, Product, ProductBrand};

/// Display fields joined onto a product at read time.
///
/// Every field is `None` when the related record is missing. The view is
/// computed per response and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductEnrichment {
    pub product_brand_name: Option<String>,
    pub product_brand_name_ar: Option<String>,
    pub manufacturer_country: Option<String>,
    pub manufacturer_country_ar: Option<String>,
    pub compatible_car_model: Option<String>,
    pub compatible_car_model_ar: Option<String>,
    pub compatible_car_year_from: Option<i32>,
    pub compatible_car_year_to: Option<i32>,
    pub compatible_car_brand: Option<String>,
    pub compatible_car_brand_ar: Option<String>,
    pub compatible_car_models_count: usize,
}

impl ProductEnrichment {
    /// Build the enrichment from already resolved related records.
    ///
    /// `first_model` is the model referenced by the first compatible model id
    /// and `model_brand` is that model's brand.
    pub fn from_related(
        product: &Product,
        brand: Option<&ProductBrand>,
        first_model: Option<&CarModel>,
        model_brand: Option<&CarBrand>,
    ) -> Self {
        Self {
            product_brand_name: brand.map(|b| b.name.clone()),
            product_brand_name_ar: brand.and_then(|b| b.name_ar.clone()),
            manufacturer_country: brand.and_then(|b| b.country_of_origin.clone()),
            manufacturer_country_ar: brand.and_then(|b| b.country_of_origin_ar.clone()),
            compatible_car_model: first_model.map(|m| m.name.clone()),
            compatible_car_model_ar: first_model.and_then(|m| m.name_ar.clone()),
            compatible_car_year_from: first_model.and_then(|m| m.year_start),
            compatible_car_year_to: first_model.and_then(|m| m.year_end),
            compatible_car_brand: model_brand.map(|b| b.name.clone()),
            compatible_car_brand_ar: model_brand.and_then(|b| b.name_ar.clone()),
            compatible_car_models_count: product.car_model_ids.len(),
        }
    }
}

/// Product plus its enrichment, serialized as a single flat object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(flatten)]
    pub enrichment: ProductEnrichment,
}

impl ProductView {
    /// Pair a product with its enrichment.
    pub fn new(product: Product, enrichment: ProductEnrichment) -> Self {
        Self {
            product,
            enrichment,
        }
    }
}
