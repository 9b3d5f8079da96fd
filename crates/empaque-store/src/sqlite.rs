// SPDX-License-Identifier: Apache-2.0

use crate::catalog::CatalogStore;
use crate::error::{StoreError, StoreErrorCode};
use empaque_model::{
    Advertisement, AdvertisementId, HexColor, Product, ProductId, SizeVariant, Slug,
    PRODUCT_SCHEMA_VERSION,
};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const DDL: &str = "
CREATE TABLE IF NOT EXISTS products (
    id                TEXT PRIMARY KEY,
    slug              TEXT NOT NULL UNIQUE,
    name              TEXT NOT NULL,
    description       TEXT NOT NULL,
    category          TEXT NOT NULL,
    image_url         TEXT NOT NULL,
    image_public_id   TEXT,
    featured          INTEGER NOT NULL DEFAULT 0,
    has_size_variants INTEGER NOT NULL DEFAULT 0,
    size_variants     TEXT NOT NULL DEFAULT '[]',
    views             INTEGER NOT NULL DEFAULT 0,
    rating            REAL NOT NULL DEFAULT 0,
    schema_version    INTEGER NOT NULL,
    created_at_ms     INTEGER NOT NULL,
    updated_at_ms     INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at_ms);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);

CREATE TABLE IF NOT EXISTS advertisements (
    id               TEXT PRIMARY KEY,
    text             TEXT NOT NULL,
    background_color TEXT NOT NULL,
    text_color       TEXT NOT NULL,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at_ms    INTEGER NOT NULL,
    updated_at_ms    INTEGER NOT NULL
);
";

const PRODUCT_COLUMNS: &str = "id, slug, name, description, category, image_url, \
     image_public_id, featured, has_size_variants, size_variants, views, rating, \
     schema_version, created_at_ms, updated_at_ms";

/// SQLite-backed catalog. One connection behind a mutex; the catalog is
/// small and admin writes are rare, so contention is not a concern.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(DDL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(DDL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::new(StoreErrorCode::Internal, "store mutex poisoned"))
    }
}

fn corrupt(column: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::new(
        StoreErrorCode::Internal,
        format!("corrupt column {column}: {detail}"),
    )
}

/// Decodes a row and lifts legacy schema versions to the current one.
fn row_to_product(row: &Row<'_>) -> Result<Product, StoreError> {
    let id: String = row.get(0)?;
    let slug: String = row.get(1)?;
    let size_variants_json: String = row.get(9)?;
    let size_variants: Vec<SizeVariant> = serde_json::from_str(&size_variants_json)?;
    let views: i64 = row.get(10)?;
    let schema_version: i64 = row.get(12)?;
    let created_at_ms: i64 = row.get(13)?;
    let updated_at_ms: i64 = row.get(14)?;
    let product = Product {
        id: ProductId::parse(&id).map_err(|e| corrupt("id", e))?,
        slug: Slug::parse(&slug).map_err(|e| corrupt("slug", e))?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        image_url: row.get(5)?,
        image_public_id: row.get(6)?,
        featured: row.get::<_, i64>(7)? != 0,
        has_size_variants: row.get::<_, i64>(8)? != 0,
        size_variants,
        views: u64::try_from(views).map_err(|e| corrupt("views", e))?,
        rating: row.get(11)?,
        schema_version: u32::try_from(schema_version).map_err(|e| corrupt("schema_version", e))?,
        created_at_ms: u64::try_from(created_at_ms).map_err(|e| corrupt("created_at_ms", e))?,
        updated_at_ms: u64::try_from(updated_at_ms).map_err(|e| corrupt("updated_at_ms", e))?,
    };
    Ok(product.upgraded())
}

fn row_to_advertisement(row: &Row<'_>) -> Result<Advertisement, StoreError> {
    let id: String = row.get(0)?;
    let background: String = row.get(2)?;
    let text_color: String = row.get(3)?;
    let created_at_ms: i64 = row.get(5)?;
    let updated_at_ms: i64 = row.get(6)?;
    Ok(Advertisement {
        id: AdvertisementId::parse(&id).map_err(|e| corrupt("id", e))?,
        text: row.get(1)?,
        background_color: HexColor::parse(&background).map_err(|e| corrupt("background_color", e))?,
        text_color: HexColor::parse(&text_color).map_err(|e| corrupt("text_color", e))?,
        is_active: row.get::<_, i64>(4)? != 0,
        created_at_ms: u64::try_from(created_at_ms).map_err(|e| corrupt("created_at_ms", e))?,
        updated_at_ms: u64::try_from(updated_at_ms).map_err(|e| corrupt("updated_at_ms", e))?,
    })
}

impl CatalogStore for SqliteCatalogStore {
    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at_ms DESC, id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| Ok(row_to_product(row)))?;
        let mut products = Vec::new();
        for row in rows {
            products.push(row??);
        }
        Ok(products)
    }

    fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        conn.query_row(&sql, params![id.to_string()], |row| Ok(row_to_product(row)))
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::not_found("product", &id.to_string())
                }
                other => other.into(),
            })?
    }

    fn get_product_by_slug(&self, slug: &Slug) -> Result<Product, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = ?1");
        conn.query_row(&sql, params![slug.to_string()], |row| Ok(row_to_product(row)))
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::not_found("product", &slug.to_string())
                }
                other => other.into(),
            })?
    }

    fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        product
            .validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, e.to_string()))?;
        let size_variants = serde_json::to_string(&product.size_variants)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO products (id, slug, name, description, category, image_url, \
             image_public_id, featured, has_size_variants, size_variants, views, rating, \
             schema_version, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                product.id.to_string(),
                product.slug.to_string(),
                product.name,
                product.description,
                product.category,
                product.image_url,
                product.image_public_id,
                i64::from(product.featured),
                i64::from(product.has_size_variants),
                size_variants,
                i64::try_from(product.views).unwrap_or(i64::MAX),
                product.rating,
                i64::from(PRODUCT_SCHEMA_VERSION),
                i64::try_from(product.created_at_ms).unwrap_or(0),
                i64::try_from(product.updated_at_ms).unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        product
            .validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, e.to_string()))?;
        let size_variants = serde_json::to_string(&product.size_variants)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE products SET slug = ?2, name = ?3, description = ?4, category = ?5, \
             image_url = ?6, image_public_id = ?7, featured = ?8, has_size_variants = ?9, \
             size_variants = ?10, rating = ?11, schema_version = ?12, updated_at_ms = ?13 \
             WHERE id = ?1",
            params![
                product.id.to_string(),
                product.slug.to_string(),
                product.name,
                product.description,
                product.category,
                product.image_url,
                product.image_public_id,
                i64::from(product.featured),
                i64::from(product.has_size_variants),
                size_variants,
                product.rating,
                i64::from(PRODUCT_SCHEMA_VERSION),
                i64::try_from(product.updated_at_ms).unwrap_or(0),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("product", &product.id.to_string()));
        }
        Ok(())
    }

    fn delete_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        let product = self.get_product(id)?;
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM products WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(product)
    }

    fn record_view(&self, id: &ProductId) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE products SET views = views + 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("product", &id.to_string()));
        }
        let views: i64 = conn.query_row(
            "SELECT views FROM products WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(views).map_err(|e| corrupt("views", e))
    }

    fn list_advertisements(&self) -> Result<Vec<Advertisement>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, background_color, text_color, is_active, created_at_ms, \
             updated_at_ms FROM advertisements ORDER BY created_at_ms DESC, id",
        )?;
        let rows = stmt.query_map([], |row| Ok(row_to_advertisement(row)))?;
        let mut ads = Vec::new();
        for row in rows {
            ads.push(row??);
        }
        Ok(ads)
    }

    fn list_active_advertisements(&self) -> Result<Vec<Advertisement>, StoreError> {
        let mut ads = self.list_advertisements()?;
        ads.retain(|ad| ad.is_active);
        Ok(ads)
    }

    fn insert_advertisement(&self, ad: &Advertisement) -> Result<(), StoreError> {
        ad.validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, e.to_string()))?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO advertisements (id, text, background_color, text_color, is_active, \
             created_at_ms, updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ad.id.to_string(),
                ad.text,
                ad.background_color.to_string(),
                ad.text_color.to_string(),
                i64::from(ad.is_active),
                i64::try_from(ad.created_at_ms).unwrap_or(0),
                i64::try_from(ad.updated_at_ms).unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    fn update_advertisement(&self, ad: &Advertisement) -> Result<(), StoreError> {
        ad.validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, e.to_string()))?;
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE advertisements SET text = ?2, background_color = ?3, text_color = ?4, \
             is_active = ?5, updated_at_ms = ?6 WHERE id = ?1",
            params![
                ad.id.to_string(),
                ad.text,
                ad.background_color.to_string(),
                ad.text_color.to_string(),
                i64::from(ad.is_active),
                i64::try_from(ad.updated_at_ms).unwrap_or(0),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("advertisement", &ad.id.to_string()));
        }
        Ok(())
    }

    fn delete_advertisement(&self, id: &AdvertisementId) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM advertisements WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("advertisement", &id.to_string()));
        }
        Ok(())
    }
}
