// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use empaque_api::{status_for, ApiError, ApiErrorCode};
use empaque_store::{StoreError, StoreErrorCode};
use serde_json::json;
use std::sync::atomic::Ordering;

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.len() <= 128 {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status =
        StatusCode::from_u16(status_for(err.code)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = err.request_id.clone();
    let resp = (status, Json(json!({"error": err}))).into_response();
    with_request_id(resp, &request_id)
}

pub(crate) fn store_error(err: &StoreError, request_id: &str) -> ApiError {
    let code = match err.code {
        StoreErrorCode::NotFound => ApiErrorCode::NotFound,
        StoreErrorCode::Validation => ApiErrorCode::ValidationFailed,
        StoreErrorCode::Conflict => ApiErrorCode::InvalidParameter,
        _ => ApiErrorCode::Internal,
    };
    ApiError::new(code, err.message.clone(), json!({}), request_id)
}

/// Bearer-token admin guard. No configured token means admin is off and
/// every request is rejected; a missing header is 401, a wrong token 403.
pub(crate) fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
) -> Result<(), Response> {
    let Some(expected) = state.api.admin_token.as_deref() else {
        return Err(api_error_response(ApiError::new(
            ApiErrorCode::Forbidden,
            "admin access is not configured",
            json!({}),
            request_id,
        )));
    };
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        None => Err(api_error_response(ApiError::new(
            ApiErrorCode::Unauthorized,
            "missing bearer token",
            json!({}),
            request_id,
        ))),
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(api_error_response(ApiError::new(
            ApiErrorCode::Forbidden,
            "invalid bearer token",
            json!({}),
            request_id,
        ))),
    }
}
