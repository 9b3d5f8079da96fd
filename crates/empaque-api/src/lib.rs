// SPDX-License-Identifier: Apache-2.0

//! Wire contract for the empaque REST surface.
//!
//! The JSON the storefront and admin panel speak is camelCase; everything in
//! here converts between that shape and the snake_case domain types.

#![forbid(unsafe_code)]

mod dto;
mod errors;
mod form;

pub use dto::{
    AdvertisementDto, AdvertisementInputDto, ProductDto, ProductPageDto, QuotationDto,
    QuotationItemDto, SizeVariantDto,
};
pub use errors::{status_for, ApiError, ApiErrorCode};
pub use form::{parse_product_form, ImagePart, ProductFormFields, ProductInput};

pub const CRATE_NAME: &str = "empaque-api";
