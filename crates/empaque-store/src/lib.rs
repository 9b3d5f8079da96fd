// SPDX-License-Identifier: Apache-2.0

//! Catalog persistence.
//!
//! [`CatalogStore`] is the seam the server talks through; the shipped
//! backend is SQLite with size variants carried as a JSON column, mirroring
//! the document shape the admin panel edits.

#![forbid(unsafe_code)]

mod catalog;
mod error;
mod ids;
mod sqlite;

pub use catalog::CatalogStore;
pub use error::{StoreError, StoreErrorCode};
pub use ids::{unix_millis, IdMinter};
pub use sqlite::SqliteCatalogStore;

pub const CRATE_NAME: &str = "empaque-store";
