// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_HEX_LEN: usize = 24;
pub const NAME_MAX_LEN: usize = 256;
pub const DESCRIPTION_MAX_LEN: usize = 4096;
pub const CATEGORY_MAX_LEN: usize = 128;
pub const SIZE_LABEL_MAX_LEN: usize = 64;

/// Current on-disk/product-wire schema revision. Version 1 predates the
/// size-variant invariant; version 2 requires `has_size_variants` to imply a
/// non-empty variant list.
pub const PRODUCT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ProductId(String);

impl ProductId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("product_id"));
        }
        if input.len() != ID_HEX_LEN {
            return Err(ParseError::InvalidFormat(
                "product_id must be 24 hex characters",
            ));
        }
        if !input
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(ParseError::InvalidFormat(
                "product_id must be lowercase hex",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL-safe identifier derived from a product name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Slug(String);

impl Slug {
    /// Lowercases the name and joins its alphanumeric runs with `-`.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_sep = false;
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('-');
                }
                pending_sep = false;
                out.push(ch.to_ascii_lowercase());
            } else {
                pending_sep = true;
            }
        }
        if out.is_empty() {
            return Err(ParseError::InvalidFormat(
                "slug requires at least one alphanumeric character in the name",
            ));
        }
        Ok(Self(out))
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("slug"));
        }
        let valid = input
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid || input.starts_with('-') || input.ends_with('-') {
            return Err(ParseError::InvalidFormat(
                "slug must be lowercase alphanumeric runs joined by '-'",
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named size option of a product. Owned by its parent; no identity of its
/// own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SizeVariant {
    pub size: String,
    pub is_available: bool,
}

impl SizeVariant {
    pub fn new(size: impl Into<String>, is_available: bool) -> Result<Self, ParseError> {
        let size = size.into();
        if size.is_empty() {
            return Err(ParseError::Empty("size"));
        }
        if size.trim() != size {
            return Err(ParseError::Trimmed("size"));
        }
        if size.len() > SIZE_LABEL_MAX_LEN {
            return Err(ParseError::TooLong("size", SIZE_LABEL_MAX_LEN));
        }
        Ok(Self { size, is_available })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Product {
    pub id: ProductId,
    pub slug: Slug,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub image_public_id: Option<String>,
    pub featured: bool,
    pub has_size_variants: bool,
    pub size_variants: Vec<SizeVariant>,
    pub views: u64,
    pub rating: f64,
    pub schema_version: u32,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Product {
    /// Checks the invariants every stored or served product must satisfy.
    ///
    /// The size-variant rule is the version-2 schema fix: a product that
    /// advertises variants must actually carry at least one.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.is_empty() {
            return Err(ParseError::Empty("name"));
        }
        if self.name.len() > NAME_MAX_LEN {
            return Err(ParseError::TooLong("name", NAME_MAX_LEN));
        }
        if self.description.is_empty() {
            return Err(ParseError::Empty("description"));
        }
        if self.description.len() > DESCRIPTION_MAX_LEN {
            return Err(ParseError::TooLong("description", DESCRIPTION_MAX_LEN));
        }
        if self.category.is_empty() {
            return Err(ParseError::Empty("category"));
        }
        if self.category.len() > CATEGORY_MAX_LEN {
            return Err(ParseError::TooLong("category", CATEGORY_MAX_LEN));
        }
        if self.image_url.is_empty() {
            return Err(ParseError::Empty("image_url"));
        }
        if self.has_size_variants && self.size_variants.is_empty() {
            return Err(ParseError::InvalidFormat(
                "size_variants must be non-empty when has_size_variants is set",
            ));
        }
        for v in &self.size_variants {
            SizeVariant::new(v.size.clone(), v.is_available)?;
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ParseError::InvalidFormat("rating must be within 0..=5"));
        }
        Ok(())
    }

    /// Lifts a version-1 record to the current schema. Version-1 rows could
    /// advertise variants without carrying any; those lose the flag instead
    /// of failing validation.
    #[must_use]
    pub fn upgraded(mut self) -> Self {
        if self.schema_version < PRODUCT_SCHEMA_VERSION {
            if self.size_variants.is_empty() {
                self.has_size_variants = false;
            }
            self.schema_version = PRODUCT_SCHEMA_VERSION;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            id: ProductId::parse("5f2a9c0de4b0a1b2c3d4e5f6").unwrap(),
            slug: Slug::from_name("Bolsa Camiseta 30x40").unwrap(),
            name: "Bolsa Camiseta 30x40".to_string(),
            description: "Bolsa plastica reforzada".to_string(),
            category: "Bolsas".to_string(),
            image_url: "https://images.example/productos/bolsa.jpg".to_string(),
            image_public_id: Some("productos/bolsa".to_string()),
            featured: false,
            has_size_variants: true,
            size_variants: vec![SizeVariant::new("30x40", true).unwrap()],
            views: 0,
            rating: 0.0,
            schema_version: PRODUCT_SCHEMA_VERSION,
            created_at_ms: 1_700_000_000_000,
            updated_at_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn product_id_rejects_uppercase_and_short_input() {
        assert!(ProductId::parse("5f2a9c0de4b0a1b2c3d4e5f6").is_ok());
        assert!(ProductId::parse("5F2A9C0DE4B0A1B2C3D4E5F6").is_err());
        assert!(ProductId::parse("abc123").is_err());
        assert!(ProductId::parse("").is_err());
    }

    #[test]
    fn slug_from_name_collapses_separators() {
        assert_eq!(
            Slug::from_name("Bolsa  Camiseta 30x40").unwrap().as_str(),
            "bolsa-camiseta-30x40"
        );
        assert_eq!(Slug::from_name("  Film / Stretch  ").unwrap().as_str(), "film-stretch");
        assert!(Slug::from_name("!!!").is_err());
    }

    #[test]
    fn slug_parse_rejects_edge_dashes() {
        assert!(Slug::parse("bolsa-30x40").is_ok());
        assert!(Slug::parse("-bolsa").is_err());
        assert!(Slug::parse("bolsa-").is_err());
        assert!(Slug::parse("Bolsa").is_err());
    }

    #[test]
    fn variant_flag_requires_non_empty_variants() {
        let mut p = sample();
        p.size_variants.clear();
        assert!(p.validate().is_err());
        p.has_size_variants = false;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn v1_record_with_no_variants_loses_the_flag_on_upgrade() {
        let mut p = sample();
        p.schema_version = 1;
        p.size_variants.clear();
        let up = p.upgraded();
        assert_eq!(up.schema_version, PRODUCT_SCHEMA_VERSION);
        assert!(!up.has_size_variants);
        assert!(up.validate().is_ok());
    }

    #[test]
    fn v1_record_with_variants_keeps_them() {
        let mut p = sample();
        p.schema_version = 1;
        let up = p.upgraded();
        assert!(up.has_size_variants);
        assert_eq!(up.size_variants.len(), 1);
    }

    #[test]
    fn size_variant_rejects_blank_labels() {
        assert!(SizeVariant::new("", true).is_err());
        assert!(SizeVariant::new(" 30x40", true).is_err());
        assert!(SizeVariant::new("30x40", false).is_ok());
    }
}
