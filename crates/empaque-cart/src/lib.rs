// SPDX-License-Identifier: Apache-2.0

//! Quotation cart.
//!
//! The cart is a plain container: lines keyed by product and selected size,
//! merged on add. It knows nothing about HTTP; the client crate drains it
//! into a quotation request once the visitor submits.

#![forbid(unsafe_code)]

mod persistence;
mod store;

pub use persistence::{CartPersistence, JsonFileCart, NoopPersistence, PersistError};
pub use store::{CartLine, CartStore, LineKey, SubscriptionId};

pub const CRATE_NAME: &str = "empaque-cart";
