// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::body::Body;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::info;

pub(crate) fn normalized_header_value(
    headers: &axum::http::HeaderMap,
    name: &str,
    max_len: usize,
) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value.len() > max_len {
        return None;
    }
    Some(value.to_string())
}

/// Exact-origin CORS with preflight handling. Unlisted origins get no CORS
/// headers at all; the browser enforces the rest.
pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = normalized_header_value(req.headers(), "origin", 256);
    let allowed = origin
        .as_deref()
        .is_some_and(|o| state.api.cors_allowed_origins.iter().any(|x| x == o));

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if allowed {
            if let Some(origin_value) = origin {
                if let Ok(v) = HeaderValue::from_str(&origin_value) {
                    resp.headers_mut().insert("access-control-allow-origin", v);
                }
                resp.headers_mut().insert(
                    "access-control-allow-methods",
                    HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
                );
                resp.headers_mut().insert(
                    "access-control-allow-headers",
                    HeaderValue::from_static("authorization,content-type,x-request-id"),
                );
            }
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if allowed {
        if let Some(origin_value) = origin {
            if let Ok(v) = HeaderValue::from_str(&origin_value) {
                resp.headers_mut().insert("access-control-allow-origin", v);
            }
            resp.headers_mut()
                .insert("vary", HeaderValue::from_static("Origin"));
        }
    }
    resp
}

/// Per-request metrics, plus an audit line when enabled.
pub(crate) async fn track_requests_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |p| p.as_str().to_string());
    let request_id =
        normalized_header_value(req.headers(), "x-request-id", 128).unwrap_or_default();

    let resp = next.run(req).await;

    state
        .metrics
        .observe_request(&route, method.as_str(), resp.status(), started.elapsed())
        .await;
    if state.api.enable_audit_log {
        info!(
            target: "empaque_audit",
            method = %method,
            route = %route,
            status = resp.status().as_u16(),
            request_id = %request_id,
            latency_ms = started.elapsed().as_millis() as u64,
            "audit"
        );
    }
    resp
}
