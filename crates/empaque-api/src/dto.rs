// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use empaque_model::{
    Advertisement, ContactDetails, EmailAddress, HexColor, PhoneNumber, Product, QuotationItem,
    QuotationRequest, Rut, SizeVariant,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SizeVariantDto {
    pub size: String,
    pub is_available: bool,
}

impl From<&SizeVariant> for SizeVariantDto {
    fn from(v: &SizeVariant) -> Self {
        Self {
            size: v.size.clone(),
            is_available: v.is_available,
        }
    }
}

impl SizeVariantDto {
    pub fn into_model(self) -> Result<SizeVariant, ApiError> {
        SizeVariant::new(self.size, self.is_available)
            .map_err(|e| ApiError::invalid_field("sizeVariants", &e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub featured: bool,
    pub has_size_variants: bool,
    pub size_variants: Vec<SizeVariantDto>,
    pub views: u64,
    pub rating: f64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            slug: p.slug.to_string(),
            name: p.name.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            image_url: p.image_url.clone(),
            featured: p.featured,
            has_size_variants: p.has_size_variants,
            size_variants: p.size_variants.iter().map(SizeVariantDto::from).collect(),
            views: p.views,
            rating: p.rating,
            created_at: p.created_at_ms,
            updated_at: p.updated_at_ms,
        }
    }
}

/// One storefront listing page, as served by `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageDto {
    pub items: Vec<ProductDto>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementDto {
    pub id: String,
    pub text: String,
    pub background_color: String,
    pub text_color: String,
    pub is_active: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl From<&Advertisement> for AdvertisementDto {
    fn from(ad: &Advertisement) -> Self {
        Self {
            id: ad.id.to_string(),
            text: ad.text.clone(),
            background_color: ad.background_color.to_string(),
            text_color: ad.text_color.to_string(),
            is_active: ad.is_active,
            created_at: ad.created_at_ms,
            updated_at: ad.updated_at_ms,
        }
    }
}

/// Create/update body for a banner. Colors default like the original admin
/// form: black banner, white text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdvertisementInputDto {
    pub text: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_background() -> String {
    "#000000".to_string()
}

fn default_text_color() -> String {
    "#FFFFFF".to_string()
}

const fn default_active() -> bool {
    true
}

impl AdvertisementInputDto {
    pub fn colors(&self) -> Result<(HexColor, HexColor), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::missing_field("text"));
        }
        let background = HexColor::parse(&self.background_color)
            .map_err(|e| ApiError::invalid_field("backgroundColor", &e.to_string()))?;
        let text = HexColor::parse(&self.text_color)
            .map_err(|e| ApiError::invalid_field("textColor", &e.to_string()))?;
        Ok((background, text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuotationItemDto {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuotationDto {
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default = "default_country_code")]
    pub phone_country_code: String,
    pub phone: String,
    pub email: String,
    pub items: Vec<QuotationItemDto>,
}

fn default_country_code() -> String {
    "+56".to_string()
}

impl QuotationDto {
    /// Full server-side validation, including the RUT checksum; a browser
    /// that skipped the local checks gets the same answers here.
    pub fn into_model(self) -> Result<QuotationRequest, ApiError> {
        let rut = Rut::parse(&self.rut)
            .map_err(|e| ApiError::invalid_field("rut", &e.to_string()))?;
        let phone = PhoneNumber::parse(&self.phone_country_code, &self.phone)
            .map_err(|e| ApiError::invalid_field("phone", &e.to_string()))?;
        let email = EmailAddress::parse(&self.email)
            .map_err(|e| ApiError::invalid_field("email", &e.to_string()))?;
        let contact = ContactDetails::new(rut, self.first_name, self.last_name, phone, email)
            .map_err(|e| ApiError::invalid_field("name", &e.to_string()))?;
        let items = self
            .items
            .into_iter()
            .map(|i| QuotationItem {
                name: i.name,
                category: i.category,
                quantity: i.quantity,
                selected_size: i.selected_size,
            })
            .collect();
        QuotationRequest::new(contact, items)
            .map_err(|e| ApiError::invalid_field("items", &e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotation_json() -> serde_json::Value {
        serde_json::json!({
            "rut": "12.345.678-5",
            "firstName": "Ana",
            "lastName": "Rojas",
            "phoneCountryCode": "+56",
            "phone": "912345678",
            "email": "ana@example.cl",
            "items": [
                {"name": "Bolsa Camiseta", "category": "Bolsas", "quantity": 3, "selectedSize": "30x40"},
                {"name": "Film Stretch", "category": "Films", "quantity": 1}
            ]
        })
    }

    #[test]
    fn quotation_wire_shape_is_camel_case() {
        let dto: QuotationDto = serde_json::from_value(quotation_json()).unwrap();
        let model = dto.into_model().unwrap();
        assert_eq!(model.items.len(), 2);
        assert_eq!(model.items[0].selected_size.as_deref(), Some("30x40"));
        assert_eq!(model.items[1].selected_size, None);
    }

    #[test]
    fn bad_rut_is_a_field_level_validation_error() {
        let mut raw = quotation_json();
        raw["rut"] = serde_json::json!("12.345.678-9");
        let dto: QuotationDto = serde_json::from_value(raw).unwrap();
        let err = dto.into_model().unwrap_err();
        assert_eq!(err.code, crate::ApiErrorCode::ValidationFailed);
        assert_eq!(err.details["field_errors"][0]["field"], "rut");
    }

    #[test]
    fn country_code_defaults_to_chile() {
        let mut raw = quotation_json();
        raw.as_object_mut().unwrap().remove("phoneCountryCode");
        let dto: QuotationDto = serde_json::from_value(raw).unwrap();
        assert_eq!(dto.phone_country_code, "+56");
    }
}
