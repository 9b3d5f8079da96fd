// SPDX-License-Identifier: Apache-2.0

//! Domain model for the empaque catalog service.
//!
//! Every externally-sourced value goes through a `parse` constructor here;
//! the rest of the workspace only sees already-validated types.

#![forbid(unsafe_code)]

mod advertisement;
mod contact;
mod product;
mod quotation;

pub use advertisement::{Advertisement, AdvertisementId, HexColor};
pub use contact::{ContactDetails, EmailAddress, PhoneNumber, Rut};
pub use product::{
    ParseError, Product, ProductId, SizeVariant, Slug, PRODUCT_SCHEMA_VERSION,
};
pub use quotation::{QuotationItem, QuotationRequest};

pub const CRATE_NAME: &str = "empaque-model";
