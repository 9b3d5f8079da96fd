// SPDX-License-Identifier: Apache-2.0

use empaque_model::Product;
use serde::{Deserialize, Serialize};

/// Storefront listing filter. All clauses are conjunctive; an empty filter
/// matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Exact category match, case-insensitive.
    pub category: Option<String>,
    pub featured_only: bool,
}

impl CatalogFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.featured_only && !product.featured {
            return false;
        }
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if needle.is_empty() {
                return true;
            }
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product.description.to_lowercase().contains(&needle);
            if !in_name && !in_description {
                return false;
            }
        }
        true
    }
}

/// Convenience wrapper over [`CatalogFilter::matches`] for a whole list.
pub fn apply_filter(products: &mut Vec<Product>, filter: &CatalogFilter) {
    products.retain(|p| filter.matches(p));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::product;

    #[test]
    fn empty_filter_matches_everything() {
        let p = product("Bolsa Camiseta", "Bolsas", false, 1);
        assert!(CatalogFilter::default().matches(&p));
    }

    #[test]
    fn search_spans_name_and_description() {
        let p = product("Bolsa Camiseta", "Bolsas", false, 1);
        let by_name = CatalogFilter {
            search: Some("CAMISETA".to_string()),
            ..CatalogFilter::default()
        };
        let by_description = CatalogFilter {
            search: Some("embalaje".to_string()),
            ..CatalogFilter::default()
        };
        let miss = CatalogFilter {
            search: Some("cartulina".to_string()),
            ..CatalogFilter::default()
        };
        assert!(by_name.matches(&p));
        assert!(by_description.matches(&p));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn category_is_exact_but_case_insensitive() {
        let p = product("Film Stretch", "Films", false, 1);
        let hit = CatalogFilter {
            category: Some("films".to_string()),
            ..CatalogFilter::default()
        };
        let partial = CatalogFilter {
            category: Some("Film".to_string()),
            ..CatalogFilter::default()
        };
        assert!(hit.matches(&p));
        assert!(!partial.matches(&p));
    }

    #[test]
    fn featured_only_drops_the_rest() {
        let mut products = vec![
            product("Destacado", "Bolsas", true, 1),
            product("Normal", "Bolsas", false, 2),
        ];
        let filter = CatalogFilter {
            featured_only: true,
            ..CatalogFilter::default()
        };
        apply_filter(&mut products, &filter);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Destacado");
    }

    #[test]
    fn clauses_combine_conjunctively() {
        let p = product("Bolsa Camiseta", "Bolsas", false, 1);
        let filter = CatalogFilter {
            search: Some("bolsa".to_string()),
            category: Some("Films".to_string()),
            featured_only: false,
        };
        assert!(!filter.matches(&p));
    }
}
