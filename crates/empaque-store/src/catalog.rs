// SPDX-License-Identifier: Apache-2.0

use crate::error::StoreError;
use empaque_model::{Advertisement, AdvertisementId, Product, ProductId, Slug};

/// Persistence seam for the catalog. Implementations are synchronous; the
/// server wraps calls in `spawn_blocking` where it matters.
pub trait CatalogStore: Send + Sync {
    /// All products, newest first.
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    fn get_product(&self, id: &ProductId) -> Result<Product, StoreError>;
    fn get_product_by_slug(&self, slug: &Slug) -> Result<Product, StoreError>;
    fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    /// Full-record replacement keyed by `product.id`.
    fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    /// Removes the product and returns it, so the caller can release the
    /// hosted image it pointed at.
    fn delete_product(&self, id: &ProductId) -> Result<Product, StoreError>;
    /// Bumps the view counter and returns the new total.
    fn record_view(&self, id: &ProductId) -> Result<u64, StoreError>;

    /// All banners, newest first.
    fn list_advertisements(&self) -> Result<Vec<Advertisement>, StoreError>;
    fn list_active_advertisements(&self) -> Result<Vec<Advertisement>, StoreError>;
    fn insert_advertisement(&self, ad: &Advertisement) -> Result<(), StoreError>;
    fn update_advertisement(&self, ad: &Advertisement) -> Result<(), StoreError>;
    fn delete_advertisement(&self, id: &AdvertisementId) -> Result<(), StoreError>;
}
