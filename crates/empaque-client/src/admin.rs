// SPDX-License-Identifier: Apache-2.0

use crate::error::ClientError;
use crate::public::{decode_json, ApiClient};
use empaque_api::{AdvertisementDto, AdvertisementInputDto, ProductDto, SizeVariantDto};
use empaque_model::{AdvertisementId, ParseError, ProductId};
use reqwest::multipart::{Form, Part};

/// Text fields of a product create or update. The size-variant flag on the
/// wire is derived from whether `size_variants` is empty, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub featured: bool,
    pub size_variants: Vec<SizeVariantDto>,
}

/// Image bytes attached to a product create, or to an update that replaces
/// the hosted image.
#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Token-authenticated client for the admin surface. Every call carries the
/// bearer token; the server rejects the lot when no token is configured.
#[derive(Debug, Clone)]
pub struct AdminClient {
    api: ApiClient,
    token: String,
}

impl AdminClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api: ApiClient::new(base_url),
            token: token.into(),
        }
    }

    fn product_form(draft: &ProductDraft, image: Option<NewProductImage>) -> Result<Form, ClientError> {
        let variants = serde_json::to_string(&draft.size_variants)
            .map_err(|_| ParseError::InvalidFormat("size variants failed to encode"))?;
        let mut form = Form::new()
            .text("name", draft.name.clone())
            .text("description", draft.description.clone())
            .text("category", draft.category.clone())
            .text("featured", if draft.featured { "true" } else { "false" })
            .text(
                "hasSizeVariants",
                if draft.size_variants.is_empty() { "false" } else { "true" },
            )
            .text("sizeVariants", variants);
        if let Some(image) = image {
            let part = Part::bytes(image.bytes)
                .file_name(image.filename)
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }
        Ok(form)
    }

    pub async fn create_product(
        &self,
        draft: &ProductDraft,
        image: NewProductImage,
    ) -> Result<ProductDto, ClientError> {
        let form = Self::product_form(draft, Some(image))?;
        let resp = self
            .api
            .http
            .post(self.api.url("/api/products"))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Updates the text fields and, when `image` is given, replaces the
    /// hosted image. Without one, the stored image is kept as is.
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        image: Option<NewProductImage>,
    ) -> Result<ProductDto, ClientError> {
        let form = Self::product_form(draft, image)?;
        let resp = self
            .api
            .http
            .put(self.api.url(&format!("/api/products/{id}")))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ClientError> {
        let resp = self
            .api
            .http
            .delete(self.api.url(&format!("/api/products/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let _: serde_json::Value = decode_json(resp).await?;
        Ok(())
    }

    /// Full banner list, active and inactive alike.
    pub async fn list_advertisements(&self) -> Result<Vec<AdvertisementDto>, ClientError> {
        let resp = self
            .api
            .http
            .get(self.api.url("/api/advertisements"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn create_advertisement(
        &self,
        input: &AdvertisementInputDto,
    ) -> Result<AdvertisementDto, ClientError> {
        let resp = self
            .api
            .http
            .post(self.api.url("/api/advertisements"))
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn update_advertisement(
        &self,
        id: &AdvertisementId,
        input: &AdvertisementInputDto,
    ) -> Result<AdvertisementDto, ClientError> {
        let resp = self
            .api
            .http
            .put(self.api.url(&format!("/api/advertisements/{id}")))
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn delete_advertisement(&self, id: &AdvertisementId) -> Result<(), ClientError> {
        let resp = self
            .api
            .http
            .delete(self.api.url(&format!("/api/advertisements/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let _: serde_json::Value = decode_json(resp).await?;
        Ok(())
    }
}
