// SPDX-License-Identifier: Apache-2.0

//! Multipart product form decoding.
//!
//! The server collects the raw multipart parts into [`ProductFormFields`];
//! [`parse_product_form`] turns them into a validated [`ProductInput`].
//! Create requires an image part, update accepts the form without one and
//! keeps the stored image.

use crate::dto::SizeVariantDto;
use crate::errors::ApiError;
use empaque_model::SizeVariant;
use std::collections::BTreeMap;

pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// One uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw multipart fields, keyed by part name, before validation.
#[derive(Debug, Clone, Default)]
pub struct ProductFormFields {
    pub text: BTreeMap<String, String>,
    pub image: Option<ImagePart>,
}

impl ProductFormFields {
    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.text.insert(name.into(), value.into());
    }
}

/// Validated product payload ready for the store layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub featured: bool,
    pub has_size_variants: bool,
    pub size_variants: Vec<SizeVariant>,
    pub image: Option<ImagePart>,
}

pub fn parse_product_form(
    fields: ProductFormFields,
    require_image: bool,
) -> Result<ProductInput, ApiError> {
    let name = required_text(&fields, "name")?;
    let description = required_text(&fields, "description")?;
    let category = required_text(&fields, "category")?;
    let featured = optional_bool(&fields, "featured")?.unwrap_or(false);
    let has_size_variants = optional_bool(&fields, "hasSizeVariants")?.unwrap_or(false);

    let size_variants = match fields.text.get("sizeVariants") {
        None => Vec::new(),
        Some(raw) if raw.trim().is_empty() => Vec::new(),
        Some(raw) => parse_size_variants(raw)?,
    };
    if has_size_variants && size_variants.is_empty() {
        return Err(ApiError::invalid_field(
            "sizeVariants",
            "hasSizeVariants is true but no variants were provided",
        ));
    }
    if !has_size_variants && !size_variants.is_empty() {
        return Err(ApiError::invalid_field(
            "sizeVariants",
            "variants were provided but hasSizeVariants is false",
        ));
    }

    let image = match fields.image {
        Some(part) => Some(checked_image(part)?),
        None if require_image => return Err(ApiError::missing_field("image")),
        None => None,
    };

    Ok(ProductInput {
        name,
        description,
        category,
        featured,
        has_size_variants,
        size_variants,
        image,
    })
}

fn required_text(fields: &ProductFormFields, name: &str) -> Result<String, ApiError> {
    match fields.text.get(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(ApiError::invalid_field(name, "must not be blank")),
        None => Err(ApiError::missing_field(name)),
    }
}

// HTML checkboxes arrive as the strings "true"/"false"; anything else is
// a client bug, not a default.
fn optional_bool(fields: &ProductFormFields, name: &str) -> Result<Option<bool>, ApiError> {
    match fields.text.get(name).map(String::as_str) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(ApiError::invalid_field(name, "expected \"true\" or \"false\"")),
    }
}

/// The `sizeVariants` part is a JSON array serialized into a text field,
/// the way browser `FormData` carries structured data.
fn parse_size_variants(raw: &str) -> Result<Vec<SizeVariant>, ApiError> {
    let dtos: Vec<SizeVariantDto> = serde_json::from_str(raw)
        .map_err(|e| ApiError::malformed_size_variants(&e.to_string()))?;
    dtos.into_iter().map(SizeVariantDto::into_model).collect()
}

fn checked_image(part: ImagePart) -> Result<ImagePart, ApiError> {
    if !part.content_type.starts_with("image/") {
        return Err(ApiError::invalid_field(
            "image",
            "content type must be image/*",
        ));
    }
    if part.bytes.is_empty() {
        return Err(ApiError::invalid_field("image", "file is empty"));
    }
    if part.bytes.len() > IMAGE_MAX_BYTES {
        return Err(ApiError::new(
            crate::ApiErrorCode::PayloadTooLarge,
            "image exceeds the 5 MiB upload limit",
            serde_json::json!({"limit_bytes": IMAGE_MAX_BYTES, "got_bytes": part.bytes.len()}),
            "req-unknown",
        ));
    }
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiErrorCode;

    fn png() -> ImagePart {
        ImagePart {
            filename: "bolsa.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    fn base_fields() -> ProductFormFields {
        let mut f = ProductFormFields::default();
        f.set_text("name", "Bolsa Camiseta");
        f.set_text("description", "Bolsa reutilizable 30x40");
        f.set_text("category", "Bolsas");
        f
    }

    #[test]
    fn create_form_with_image_parses() {
        let mut f = base_fields();
        f.image = Some(png());
        let input = parse_product_form(f, true).unwrap();
        assert_eq!(input.name, "Bolsa Camiseta");
        assert!(!input.featured);
        assert!(!input.has_size_variants);
        assert!(input.image.is_some());
    }

    #[test]
    fn create_without_image_is_rejected_but_update_is_not() {
        let f = base_fields();
        assert!(parse_product_form(f.clone(), true).is_err());
        let input = parse_product_form(f, false).unwrap();
        assert!(input.image.is_none());
    }

    #[test]
    fn size_variants_round_through_the_json_field() {
        let mut f = base_fields();
        f.image = Some(png());
        f.set_text("hasSizeVariants", "true");
        f.set_text(
            "sizeVariants",
            r#"[{"size":"30x40","isAvailable":true},{"size":"40x50","isAvailable":false}]"#,
        );
        let input = parse_product_form(f, true).unwrap();
        assert_eq!(input.size_variants.len(), 2);
        assert_eq!(input.size_variants[0].size, "30x40");
        assert!(!input.size_variants[1].is_available);
    }

    #[test]
    fn malformed_size_variants_get_their_own_code() {
        let mut f = base_fields();
        f.image = Some(png());
        f.set_text("hasSizeVariants", "true");
        f.set_text("sizeVariants", "[{bad json");
        let err = parse_product_form(f, true).unwrap_err();
        assert_eq!(err.code, ApiErrorCode::MalformedSizeVariants);
    }

    #[test]
    fn variant_flag_and_list_must_agree() {
        let mut f = base_fields();
        f.image = Some(png());
        f.set_text("hasSizeVariants", "true");
        assert!(parse_product_form(f.clone(), true).is_err());

        f.set_text("hasSizeVariants", "false");
        f.set_text("sizeVariants", r#"[{"size":"30x40","isAvailable":true}]"#);
        assert!(parse_product_form(f, true).is_err());
    }

    #[test]
    fn booleans_must_be_literal_strings() {
        let mut f = base_fields();
        f.image = Some(png());
        f.set_text("featured", "yes");
        assert!(parse_product_form(f, true).is_err());
    }

    #[test]
    fn non_image_uploads_are_rejected() {
        let mut f = base_fields();
        f.image = Some(ImagePart {
            filename: "nota.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert!(parse_product_form(f, true).is_err());
    }

    #[test]
    fn oversized_image_maps_to_payload_too_large() {
        let mut f = base_fields();
        f.image = Some(ImagePart {
            filename: "big.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; IMAGE_MAX_BYTES + 1],
        });
        let err = parse_product_form(f, true).unwrap_err();
        assert_eq!(err.code, ApiErrorCode::PayloadTooLarge);
    }
}
