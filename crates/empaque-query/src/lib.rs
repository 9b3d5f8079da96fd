// SPDX-License-Identifier: Apache-2.0

//! In-memory catalog querying.
//!
//! The whole catalog is small enough to filter and sort in memory, so the
//! server loads the product list from the store and runs it through these
//! functions per request. Featured products always sort ahead of the rest,
//! whatever secondary order the visitor picked.

#![forbid(unsafe_code)]

mod filter;
mod page;
mod sort;

pub use filter::{apply_filter, CatalogFilter};
pub use page::{paginate, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use sort::{sort_products, SortKey};

use empaque_model::Product;

/// Filter, order and slice one storefront listing request.
#[must_use]
pub fn run_catalog_query(
    mut products: Vec<Product>,
    filter: &CatalogFilter,
    sort: SortKey,
    page: PageRequest,
) -> Page<Product> {
    products.retain(|p| filter.matches(p));
    sort_products(&mut products, sort);
    paginate(products, page)
}

pub const CRATE_NAME: &str = "empaque-query";

#[cfg(test)]
mod tests {
    use super::*;
    use empaque_model::{Product, ProductId, Slug, PRODUCT_SCHEMA_VERSION};

    pub(crate) fn product(name: &str, category: &str, featured: bool, created: u64) -> Product {
        let id_hex = format!("{:024x}", created + 1);
        Product {
            id: ProductId::parse(&id_hex).unwrap(),
            slug: Slug::from_name(name).unwrap(),
            name: name.to_string(),
            description: format!("{name} para embalaje"),
            category: category.to_string(),
            image_url: format!("https://img.example/{name}.png"),
            image_public_id: None,
            featured,
            has_size_variants: false,
            size_variants: Vec::new(),
            views: 0,
            rating: 0.0,
            schema_version: PRODUCT_SCHEMA_VERSION,
            created_at_ms: created,
            updated_at_ms: created,
        }
    }

    #[test]
    fn full_query_filters_sorts_and_pages() {
        let products = vec![
            product("Cinta Adhesiva", "Cintas", false, 10),
            product("Bolsa Camiseta", "Bolsas", true, 20),
            product("Bolsa Basura", "Bolsas", false, 30),
            product("Film Stretch", "Films", false, 40),
        ];
        let filter = CatalogFilter {
            search: Some("bolsa".to_string()),
            ..CatalogFilter::default()
        };
        let page = run_catalog_query(
            products,
            &filter,
            SortKey::Newest,
            PageRequest::new(1, 10),
        );
        assert_eq!(page.total_items, 2);
        // Featured first even though the other match is newer.
        assert_eq!(page.items[0].name, "Bolsa Camiseta");
        assert_eq!(page.items[1].name, "Bolsa Basura");
    }
}
