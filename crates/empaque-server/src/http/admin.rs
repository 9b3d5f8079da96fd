// SPDX-License-Identifier: Apache-2.0

use crate::http::helpers::{
    api_error_response, propagated_request_id, require_admin, store_error, with_request_id,
};
use crate::AppState;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use empaque_api::{
    parse_product_form, AdvertisementDto, AdvertisementInputDto, ApiError, ApiErrorCode,
    ImagePart, ProductDto, ProductFormFields, ProductInput,
};
use empaque_model::{
    Advertisement, AdvertisementId, Product, ProductId, Slug, PRODUCT_SCHEMA_VERSION,
};
use empaque_store::unix_millis;
use serde_json::json;
use tracing::{error, warn};

async fn collect_product_form(mut multipart: Multipart) -> Result<ProductFormFields, ApiError> {
    let mut fields = ProductFormFields::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(ApiError::new(
                    ApiErrorCode::ValidationFailed,
                    format!("malformed multipart body: {e}"),
                    json!({}),
                    "req-unknown",
                ))
            }
        };
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::new(
                    ApiErrorCode::PayloadTooLarge,
                    format!("image upload failed: {e}"),
                    json!({}),
                    "req-unknown",
                )
            })?;
            fields.image = Some(ImagePart {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_field(&name, &e.to_string()))?;
            fields.set_text(name, value);
        }
    }
    Ok(fields)
}

fn product_from_input(
    id: ProductId,
    slug: Slug,
    input: &ProductInput,
    image_url: String,
    image_public_id: Option<String>,
    views: u64,
    created_at_ms: u64,
) -> Product {
    Product {
        id,
        slug,
        name: input.name.clone(),
        description: input.description.clone(),
        category: input.category.clone(),
        image_url,
        image_public_id,
        featured: input.featured,
        has_size_variants: input.has_size_variants,
        size_variants: input.size_variants.clone(),
        views,
        rating: 0.0,
        schema_version: PRODUCT_SCHEMA_VERSION,
        created_at_ms,
        updated_at_ms: unix_millis(),
    }
}

pub(crate) async fn create_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let fields = match collect_product_form(multipart).await {
        Ok(fields) => fields,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let input = match parse_product_form(fields, true) {
        Ok(input) => input,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let slug = match Slug::from_name(&input.name) {
        Ok(slug) => slug,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_field("name", &e.to_string()).with_request_id(&request_id),
            )
        }
    };

    // parse_product_form guarantees the image for creates.
    let Some(image) = input.image.as_ref() else {
        return api_error_response(ApiError::missing_field("image").with_request_id(&request_id));
    };
    let hosted = match state
        .images
        .upload(&image.filename, &image.content_type, &image.bytes)
        .await
    {
        Ok(hosted) => hosted,
        Err(e) => {
            error!(request_id = %request_id, "image upload failed: {e}");
            return api_error_response(ApiError::new(
                ApiErrorCode::UpstreamFailure,
                "image host rejected the upload",
                json!({}),
                request_id,
            ));
        }
    };

    let minted = state.minter.mint(&input.name);
    let id = match ProductId::parse(&minted) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(
                ApiError::new(
                    ApiErrorCode::Internal,
                    format!("id minting failed: {e}"),
                    json!({}),
                    request_id,
                ),
            )
        }
    };
    let now = unix_millis();
    let product = product_from_input(
        id,
        slug,
        &input,
        hosted.url.clone(),
        Some(hosted.public_id.clone()),
        0,
        now,
    );
    if let Err(e) = state.store.insert_product(&product) {
        // No rollback: the hosted image is orphaned, which is recoverable
        // by hand, unlike a catalog row pointing at a missing image.
        error!(
            request_id = %request_id,
            public_id = %hosted.public_id,
            "insert failed after upload, hosted image orphaned: {e}"
        );
        return api_error_response(store_error(&e, &request_id));
    }
    let resp = (StatusCode::CREATED, Json(ProductDto::from(&product))).into_response();
    with_request_id(resp, &request_id)
}

pub(crate) async fn update_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let id = match ProductId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("id", &raw_id).with_request_id(&request_id),
            )
        }
    };
    let existing = match state.store.get_product(&id) {
        Ok(product) => product,
        Err(e) => return api_error_response(store_error(&e, &request_id)),
    };
    let fields = match collect_product_form(multipart).await {
        Ok(fields) => fields,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let input = match parse_product_form(fields, false) {
        Ok(input) => input,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let slug = match Slug::from_name(&input.name) {
        Ok(slug) => slug,
        Err(e) => {
            return api_error_response(
                ApiError::invalid_field("name", &e.to_string()).with_request_id(&request_id),
            )
        }
    };

    let (image_url, image_public_id) = match input.image.as_ref() {
        None => (existing.image_url.clone(), existing.image_public_id.clone()),
        Some(image) => {
            // Two-phase replace: release the old image first, then upload
            // the new one. A failed delete only leaks storage upstream.
            let old_public_id = existing
                .image_public_id
                .clone()
                .or_else(|| crate::images::public_id_from_url(&existing.image_url));
            if let Some(old_id) = old_public_id.as_deref() {
                if let Err(e) = state.images.delete(old_id).await {
                    warn!(request_id = %request_id, public_id = %old_id, "old image delete failed: {e}");
                }
            }
            match state
                .images
                .upload(&image.filename, &image.content_type, &image.bytes)
                .await
            {
                Ok(hosted) => (hosted.url, Some(hosted.public_id)),
                Err(e) => {
                    error!(
                        request_id = %request_id,
                        product_id = %id,
                        "replacement upload failed, product keeps a dangling image reference: {e}"
                    );
                    return api_error_response(ApiError::new(
                        ApiErrorCode::UpstreamFailure,
                        "image host rejected the upload",
                        json!({}),
                        request_id,
                    ));
                }
            }
        }
    };

    let product = product_from_input(
        id,
        slug,
        &input,
        image_url,
        image_public_id,
        existing.views,
        existing.created_at_ms,
    );
    if let Err(e) = state.store.update_product(&product) {
        return api_error_response(store_error(&e, &request_id));
    }
    with_request_id(Json(ProductDto::from(&product)).into_response(), &request_id)
}

pub(crate) async fn delete_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let id = match ProductId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("id", &raw_id).with_request_id(&request_id),
            )
        }
    };
    let removed = match state.store.delete_product(&id) {
        Ok(removed) => removed,
        Err(e) => return api_error_response(store_error(&e, &request_id)),
    };
    // Rows older than the public_id column fall back to the URL-derived id.
    let public_id = removed
        .image_public_id
        .clone()
        .or_else(|| crate::images::public_id_from_url(&removed.image_url));
    if let Some(public_id) = public_id.as_deref() {
        if let Err(e) = state.images.delete(public_id).await {
            warn!(request_id = %request_id, public_id = %public_id, "image delete failed: {e}");
        }
    }
    with_request_id(
        Json(json!({"deleted": removed.id.to_string()})).into_response(),
        &request_id,
    )
}

pub(crate) async fn list_advertisements_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    match state.store.list_advertisements() {
        Ok(ads) => {
            let dtos: Vec<AdvertisementDto> = ads.iter().map(AdvertisementDto::from).collect();
            with_request_id(Json(dtos).into_response(), &request_id)
        }
        Err(e) => api_error_response(store_error(&e, &request_id)),
    }
}

pub(crate) async fn create_advertisement_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<AdvertisementInputDto>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let (background_color, text_color) = match input.colors() {
        Ok(colors) => colors,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let minted = state.minter.mint(&input.text);
    let id = match AdvertisementId::parse(&minted) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(ApiError::new(
                ApiErrorCode::Internal,
                format!("id minting failed: {e}"),
                json!({}),
                request_id,
            ))
        }
    };
    let now = unix_millis();
    let ad = Advertisement {
        id,
        text: input.text.trim().to_string(),
        background_color,
        text_color,
        is_active: input.is_active,
        created_at_ms: now,
        updated_at_ms: now,
    };
    if let Err(e) = state.store.insert_advertisement(&ad) {
        return api_error_response(store_error(&e, &request_id));
    }
    let resp = (StatusCode::CREATED, Json(AdvertisementDto::from(&ad))).into_response();
    with_request_id(resp, &request_id)
}

pub(crate) async fn update_advertisement_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    Json(input): Json<AdvertisementInputDto>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let id = match AdvertisementId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("id", &raw_id).with_request_id(&request_id),
            )
        }
    };
    let existing: Vec<Advertisement> = match state.store.list_advertisements() {
        Ok(ads) => ads,
        Err(e) => return api_error_response(store_error(&e, &request_id)),
    };
    let Some(current) = existing.into_iter().find(|ad| ad.id == id) else {
        return api_error_response(
            ApiError::not_found("advertisement", &raw_id).with_request_id(&request_id),
        );
    };
    let (background_color, text_color) = match input.colors() {
        Ok(colors) => colors,
        Err(e) => return api_error_response(e.with_request_id(&request_id)),
    };
    let ad = Advertisement {
        id,
        text: input.text.trim().to_string(),
        background_color,
        text_color,
        is_active: input.is_active,
        created_at_ms: current.created_at_ms,
        updated_at_ms: unix_millis(),
    };
    if let Err(e) = state.store.update_advertisement(&ad) {
        return api_error_response(store_error(&e, &request_id));
    }
    with_request_id(Json(AdvertisementDto::from(&ad)).into_response(), &request_id)
}

pub(crate) async fn delete_advertisement_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    if let Err(resp) = require_admin(&state, &headers, &request_id) {
        return resp;
    }
    let id = match AdvertisementId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return api_error_response(
                ApiError::invalid_param("id", &raw_id).with_request_id(&request_id),
            )
        }
    };
    if let Err(e) = state.store.delete_advertisement(&id) {
        return api_error_response(store_error(&e, &request_id));
    }
    with_request_id(
        Json(json!({"deleted": raw_id})).into_response(),
        &request_id,
    )
}
