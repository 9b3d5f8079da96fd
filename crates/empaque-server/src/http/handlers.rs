// SPDX-License-Identifier: Apache-2.0

use crate::http::helpers::{
    api_error_response, propagated_request_id, store_error, with_request_id,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use empaque_api::{
    AdvertisementDto, ApiError, ApiErrorCode, ProductDto, ProductPageDto, QuotationDto,
};
use empaque_model::{ProductId, Slug};
use empaque_query::{run_catalog_query, CatalogFilter, PageRequest, SortKey, DEFAULT_PAGE_SIZE};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use tracing::{error, info};

pub(crate) async fn healthz_handler() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    if state.ready.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({"ready": true}))).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"ready": false}))).into_response()
    }
}

pub(crate) async fn version_handler() -> Response {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let body = state.metrics.render().await;
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

fn parse_usize_param(
    params: &HashMap<String, String>,
    name: &str,
    default: usize,
    request_id: &str,
) -> Result<usize, Response> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            api_error_response(ApiError::invalid_param(name, raw).with_request_id(request_id))
        }),
    }
}

/// `GET /api/products` with `search`, `category`, `featured`, `sort`,
/// `page` and `perPage` query parameters.
pub(crate) async fn products_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);

    let sort = match params.get("sort") {
        None => SortKey::default(),
        Some(raw) => match SortKey::parse(raw) {
            Ok(sort) => sort,
            Err(_) => {
                return api_error_response(
                    ApiError::invalid_param("sort", raw).with_request_id(&request_id),
                )
            }
        },
    };
    let page = match parse_usize_param(&params, "page", 1, &request_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let per_page = match parse_usize_param(&params, "perPage", DEFAULT_PAGE_SIZE, &request_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = CatalogFilter {
        search: params.get("search").cloned(),
        category: params.get("category").cloned(),
        featured_only: params.get("featured").is_some_and(|v| v == "true"),
    };

    let products = match state.store.list_products() {
        Ok(products) => products,
        Err(e) => return api_error_response(store_error(&e, &request_id)),
    };
    let page = run_catalog_query(products, &filter, sort, PageRequest::new(page, per_page));
    let body = ProductPageDto {
        items: page.items.iter().map(ProductDto::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    };
    with_request_id(Json(body).into_response(), &request_id)
}

/// `GET /api/products/:id`. A detail view counts as a view.
pub(crate) async fn product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let id = match ProductId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("id", &raw_id).with_request_id(&request_id),
            )
        }
    };
    if let Err(e) = state.store.record_view(&id) {
        return api_error_response(store_error(&e, &request_id));
    }
    match state.store.get_product(&id) {
        Ok(product) => {
            with_request_id(Json(ProductDto::from(&product)).into_response(), &request_id)
        }
        Err(e) => api_error_response(store_error(&e, &request_id)),
    }
}

pub(crate) async fn product_by_slug_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_slug): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let slug = match Slug::parse(&raw_slug) {
        Ok(slug) => slug,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("slug", &raw_slug).with_request_id(&request_id),
            )
        }
    };
    match state.store.get_product_by_slug(&slug) {
        Ok(product) => {
            with_request_id(Json(ProductDto::from(&product)).into_response(), &request_id)
        }
        Err(e) => api_error_response(store_error(&e, &request_id)),
    }
}

pub(crate) async fn active_advertisements_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    match state.store.list_active_advertisements() {
        Ok(ads) => {
            let dtos: Vec<AdvertisementDto> = ads.iter().map(AdvertisementDto::from).collect();
            with_request_id(Json(dtos).into_response(), &request_id)
        }
        Err(e) => api_error_response(store_error(&e, &request_id)),
    }
}

/// `POST /api/send-quotation`. Validation runs here regardless of what the
/// storefront already checked; the mail leaves through the configured
/// relay.
pub(crate) async fn send_quotation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(dto): Json<QuotationDto>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let quotation = match dto.into_model() {
        Ok(q) => q,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    match state
        .mailer
        .send(&state.api.quotation_recipient, &quotation)
        .await
    {
        Ok(()) => {
            info!(
                rut = %quotation.contact.rut,
                items = quotation.items.len(),
                request_id = %request_id,
                "quotation sent"
            );
            with_request_id(
                Json(json!({"status": "sent", "items": quotation.items.len()})).into_response(),
                &request_id,
            )
        }
        Err(e) => {
            error!(request_id = %request_id, "quotation mail failed: {e}");
            api_error_response(ApiError::new(
                ApiErrorCode::UpstreamFailure,
                "quotation mail could not be delivered",
                json!({}),
                request_id,
            ))
        }
    }
}
