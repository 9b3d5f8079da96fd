// SPDX-License-Identifier: Apache-2.0

//! Typed client for the empaque REST API.
//!
//! [`ApiClient`] covers what the storefront needs without credentials;
//! [`AdminClient`] adds the bearer-guarded admin surface. The cart-to-mail
//! flow lives in [`ApiClient::submit_quotation`], which only empties the
//! cart once the server has accepted the request.

#![forbid(unsafe_code)]

mod admin;
mod error;
mod public;

pub use admin::{AdminClient, NewProductImage, ProductDraft};
pub use error::ClientError;
pub use public::{ApiClient, ListQuery};

pub const CRATE_NAME: &str = "empaque-client";
