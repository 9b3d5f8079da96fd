// SPDX-License-Identifier: Apache-2.0

use crate::error::ClientError;
use empaque_api::{
    AdvertisementDto, ApiError, ProductDto, ProductPageDto, QuotationDto, QuotationItemDto,
};
use empaque_cart::CartStore;
use empaque_model::{ContactDetails, ProductId, QuotationRequest, Slug};
use empaque_query::{SortKey, DEFAULT_PAGE_SIZE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub(crate) async fn decode_json<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status().as_u16();
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }
    #[derive(Deserialize)]
    struct Envelope {
        error: ApiError,
    }
    match resp.json::<Envelope>().await {
        Ok(envelope) => Err(ClientError::Api {
            status,
            error: envelope.error,
        }),
        Err(_) => Err(ClientError::UnexpectedStatus(status)),
    }
}

/// Storefront listing parameters; maps onto the `GET /api/products` query
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured_only: bool,
    pub sort: SortKey,
    pub page: usize,
    pub per_page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            featured_only: false,
            sort: SortKey::default(),
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort", self.sort.as_str().to_string()),
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if self.featured_only {
            params.push(("featured", "true".to_string()));
        }
        params
    }
}

/// Unauthenticated client for the public surface.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn list_products(&self, query: &ListQuery) -> Result<ProductPageDto, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/products"))
            .query(&query.params())
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<ProductDto, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/products/{id}")))
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn get_product_by_slug(&self, slug: &Slug) -> Result<ProductDto, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/products/by-slug/{slug}")))
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn active_advertisements(&self) -> Result<Vec<AdvertisementDto>, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/advertisements/active"))
            .send()
            .await?;
        decode_json(resp).await
    }

    pub async fn send_quotation(&self, dto: &QuotationDto) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("/api/send-quotation"))
            .json(dto)
            .send()
            .await?;
        let _: serde_json::Value = decode_json(resp).await?;
        Ok(())
    }

    /// Drains the cart into a quotation and submits it. The cart is only
    /// cleared after the server accepts; any failure leaves it untouched.
    pub async fn submit_quotation(
        &self,
        cart: &mut CartStore,
        contact: &ContactDetails,
    ) -> Result<usize, ClientError> {
        let items = cart.quotation_items();
        let quotation = QuotationRequest::new(contact.clone(), items)?;
        let dto = QuotationDto {
            rut: quotation.contact.rut.to_string(),
            first_name: quotation.contact.first_name.clone(),
            last_name: quotation.contact.last_name.clone(),
            phone_country_code: quotation.contact.phone.country_code.clone(),
            phone: quotation.contact.phone.local.clone(),
            email: quotation.contact.email.as_str().to_string(),
            items: quotation
                .items
                .iter()
                .map(|item| QuotationItemDto {
                    name: item.name.clone(),
                    category: item.category.clone(),
                    quantity: item.quantity,
                    selected_size: item.selected_size.clone(),
                })
                .collect(),
        };
        let line_count = dto.items.len();
        self.send_quotation(&dto).await?;
        debug!(lines = line_count, "quotation accepted, clearing cart");
        cart.clear();
        Ok(line_count)
    }
}
