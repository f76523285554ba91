//! Closed set of synced entity types and their per-type sync policy.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity collections clients can synchronize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Products,
    Categories,
    CarBrands,
    CarModels,
    ProductBrands,
    Orders,
}

impl EntityKind {
    /// Every synced collection.
    pub const ALL: [Self; 6] = [
        Self::Products,
        Self::Categories,
        Self::CarBrands,
        Self::CarModels,
        Self::ProductBrands,
        Self::Orders,
    ];

    /// Collections returned by the combined endpoint when none are requested.
    pub const DEFAULT_COMBINED: [Self; 5] = [
        Self::Products,
        Self::Categories,
        Self::CarBrands,
        Self::CarModels,
        Self::ProductBrands,
    ];

    /// Collection name used in responses and the `tables` parameter.
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::CarBrands => "car_brands",
            Self::CarModels => "car_models",
            Self::ProductBrands => "product_brands",
            Self::Orders => "orders",
        }
    }

    /// Look up a collection by name. Surrounding whitespace and case are
    /// ignored and hyphenated forms (`car-brands`) are accepted.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::sync::EntityKind;
    ///
    /// assert_eq!(EntityKind::from_table_name(" car-brands "), Some(EntityKind::CarBrands));
    /// assert_eq!(EntityKind::from_table_name("users"), None);
    /// ```
    pub fn from_table_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.table_name() == normalized)
    }

    /// Whether records of this type belong to a single user.
    pub const fn is_user_scoped(self) -> bool {
        matches!(self, Self::Orders)
    }

    /// Built-in policy for this type.
    pub const fn default_policy(self) -> EntityPolicy {
        match self {
            Self::Products => EntityPolicy::new(1000, 5000, 1000, SortOrder::UpdatedDesc),
            Self::Categories => EntityPolicy::new(1000, 1000, 500, SortOrder::SortOrderThenName),
            Self::CarBrands => EntityPolicy::new(500, 500, 100, SortOrder::NameAsc),
            Self::CarModels => EntityPolicy::new(1000, 1000, 200, SortOrder::NameAsc),
            Self::ProductBrands => EntityPolicy::new(500, 500, 100, SortOrder::NameAsc),
            Self::Orders => EntityPolicy::new(1000, 1000, 1000, SortOrder::CreatedDesc),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Ordering applied to a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Most recently updated first.
    UpdatedDesc,
    /// `sort_order` ascending, then name ascending.
    SortOrderThenName,
    /// Name ascending.
    NameAsc,
    /// Most recently created first.
    CreatedDesc,
    /// Least recently updated first. Stores page changes in this order so a
    /// truncated page can be resumed from its last row.
    UpdatedAsc,
}

/// Limits and ordering for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPolicy {
    /// Page size used when the client sends no limit.
    pub default_limit: usize,
    /// Upper bound applied to client-supplied limits.
    pub max_limit: usize,
    /// Maximum number of deleted ids returned per response.
    pub tombstone_ceiling: usize,
    /// Order of the records within a returned page.
    pub sort: SortOrder,
}

impl EntityPolicy {
    /// Policy from its limits and page order.
    pub const fn new(
        default_limit: usize,
        max_limit: usize,
        tombstone_ceiling: usize,
        sort: SortOrder,
    ) -> Self {
        Self {
            default_limit,
            max_limit,
            tombstone_ceiling,
            sort,
        }
    }

    /// Resolve the page size for a request. Zero becomes one and values above
    /// the ceiling are clamped.
    ///
    /// # Examples
    /// ```
    /// use catalog_backend::domain::sync::EntityKind;
    ///
    /// let policy = EntityKind::Products.default_policy();
    /// assert_eq!(policy.effective_limit(None), 1000);
    /// assert_eq!(policy.effective_limit(Some(0)), 1);
    /// assert_eq!(policy.effective_limit(Some(9000)), 5000);
    /// ```
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
            .max(1)
    }
}

/// Per-type sync policies with optional overrides.
#[derive(Debug, Clone, Default)]
pub struct DeltaSyncConfig {
    overrides: BTreeMap<EntityKind, EntityPolicy>,
}

impl DeltaSyncConfig {
    /// Replace the policy for `kind`.
    pub fn with_policy(mut self, kind: EntityKind, policy: EntityPolicy) -> Self {
        self.overrides.insert(kind, policy);
        self
    }

    /// Override only the limit ceiling for `kind`, keeping the default page
    /// size at or below it.
    pub fn with_max_limit(self, kind: EntityKind, max_limit: usize) -> Self {
        let current = self.policy(kind);
        let policy = EntityPolicy {
            max_limit,
            default_limit: current.default_limit.min(max_limit),
            ..current
        };
        self.with_policy(kind, policy)
    }

    /// Override only the tombstone ceiling for `kind`.
    pub fn with_tombstone_ceiling(self, kind: EntityKind, ceiling: usize) -> Self {
        let policy = EntityPolicy {
            tombstone_ceiling: ceiling,
            ..self.policy(kind)
        };
        self.with_policy(kind, policy)
    }

    /// Effective policy for `kind`.
    pub fn policy(&self, kind: EntityKind) -> EntityPolicy {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("products", Some(EntityKind::Products))]
    #[case("Categories", Some(EntityKind::Categories))]
    #[case("car_models", Some(EntityKind::CarModels))]
    #[case("product-brands", Some(EntityKind::ProductBrands))]
    #[case("orders", Some(EntityKind::Orders))]
    #[case("", None)]
    #[case("product", None)]
    fn resolves_table_names(#[case] name: &str, #[case] expected: Option<EntityKind>) {
        assert_eq!(EntityKind::from_table_name(name), expected);
    }

    #[rstest]
    fn table_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_table_name(kind.table_name()), Some(kind));
        }
    }

    #[rstest]
    #[case(EntityKind::Categories, Some(4000), 1000)]
    #[case(EntityKind::CarBrands, None, 500)]
    #[case(EntityKind::ProductBrands, Some(20), 20)]
    #[case(EntityKind::Orders, Some(0), 1)]
    fn limits_are_clamped(
        #[case] kind: EntityKind,
        #[case] requested: Option<usize>,
        #[case] expected: usize,
    ) {
        assert_eq!(kind.default_policy().effective_limit(requested), expected);
    }

    #[rstest]
    fn max_limit_override_lowers_default() {
        let config = DeltaSyncConfig::default().with_max_limit(EntityKind::Products, 200);
        let policy = config.policy(EntityKind::Products);
        assert_eq!(policy.max_limit, 200);
        assert_eq!(policy.effective_limit(None), 200);
        assert_eq!(config.policy(EntityKind::Categories).max_limit, 1000);
    }

    #[rstest]
    fn tombstone_override_keeps_limits() {
        let config = DeltaSyncConfig::default().with_tombstone_ceiling(EntityKind::CarBrands, 3);
        let policy = config.policy(EntityKind::CarBrands);
        assert_eq!(policy.tombstone_ceiling, 3);
        assert_eq!(policy.max_limit, 500);
    }
}
