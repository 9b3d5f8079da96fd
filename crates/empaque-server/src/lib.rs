// SPDX-License-Identifier: Apache-2.0

//! REST backend for the empaque catalog.
//!
//! Public surface serves the storefront (listing, detail, active banners,
//! quotation submission); admin surface is bearer-guarded CRUD over
//! products and banners, with product images pushed to an external host.

#![forbid(unsafe_code)]

mod config;
mod http;
mod images;
mod mail;
mod metrics;
mod middleware;

pub use config::ApiConfig;
pub use images::{
    public_id_from_url, HostedImage, HttpImageHost, ImageHost, ImageHostError, InMemoryImageHost,
};
pub use mail::{
    render_quotation_html, HttpQuotationMailer, LogOnlyMailer, MailError, QuotationMailer,
};
pub use metrics::RequestMetrics;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;
use empaque_store::{CatalogStore, IdMinter};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub images: Arc<dyn ImageHost>,
    pub mailer: Arc<dyn QuotationMailer>,
    pub minter: Arc<IdMinter>,
    pub metrics: Arc<RequestMetrics>,
    pub request_id_seed: Arc<AtomicU64>,
    pub ready: Arc<AtomicBool>,
    pub api: ApiConfig,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        images: Arc<dyn ImageHost>,
        mailer: Arc<dyn QuotationMailer>,
        api: ApiConfig,
    ) -> Self {
        Self {
            store,
            images,
            mailer,
            minter: Arc::new(IdMinter::new()),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            ready: Arc::new(AtomicBool::new(true)),
            api,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body = state.api.max_body_bytes;
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/api/version", get(http::handlers::version_handler))
        .route("/api/products", get(http::handlers::products_handler))
        .route("/api/products", post(http::admin::create_product_handler))
        .route("/api/products/:id", get(http::handlers::product_handler))
        .route("/api/products/:id", put(http::admin::update_product_handler))
        .route(
            "/api/products/:id",
            delete(http::admin::delete_product_handler),
        )
        .route(
            "/api/products/by-slug/:slug",
            get(http::handlers::product_by_slug_handler),
        )
        .route(
            "/api/advertisements",
            get(http::admin::list_advertisements_handler),
        )
        .route(
            "/api/advertisements",
            post(http::admin::create_advertisement_handler),
        )
        .route(
            "/api/advertisements/active",
            get(http::handlers::active_advertisements_handler),
        )
        .route(
            "/api/advertisements/:id",
            put(http::admin::update_advertisement_handler),
        )
        .route(
            "/api/advertisements/:id",
            delete(http::admin::delete_advertisement_handler),
        )
        .route(
            "/api/send-quotation",
            post(http::handlers::send_quotation_handler),
        )
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::track_requests_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
