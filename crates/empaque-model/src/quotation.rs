// SPDX-License-Identifier: Apache-2.0

use crate::contact::ContactDetails;
use crate::product::ParseError;
use serde::{Deserialize, Serialize};

pub const QUOTATION_MAX_ITEMS: usize = 100;
pub const QUOTATION_MAX_QUANTITY: u32 = 10_000;

/// One requested line of a quotation. Carries display data only; prices are
/// negotiated over email, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotationItem {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub selected_size: Option<String>,
}

/// Transient payload for one email send. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct QuotationRequest {
    pub contact: ContactDetails,
    pub items: Vec<QuotationItem>,
}

impl QuotationRequest {
    pub fn new(contact: ContactDetails, items: Vec<QuotationItem>) -> Result<Self, ParseError> {
        let request = Self { contact, items };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if self.items.is_empty() {
            return Err(ParseError::Empty("items"));
        }
        if self.items.len() > QUOTATION_MAX_ITEMS {
            return Err(ParseError::TooLong("items", QUOTATION_MAX_ITEMS));
        }
        for item in &self.items {
            if item.name.is_empty() {
                return Err(ParseError::Empty("items.name"));
            }
            if item.quantity == 0 {
                return Err(ParseError::InvalidFormat(
                    "item quantity must be at least 1",
                ));
            }
            if item.quantity > QUOTATION_MAX_QUANTITY {
                return Err(ParseError::InvalidFormat(
                    "item quantity exceeds the allowed maximum",
                ));
            }
            if let Some(size) = &item.selected_size {
                if size.is_empty() {
                    return Err(ParseError::Empty("items.selected_size"));
                }
            }
        }
        Ok(())
    }
}
