// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use empaque_server::{
    build_router, ApiConfig, AppState, HttpImageHost, HttpQuotationMailer, ImageHost,
    InMemoryImageHost, LogOnlyMailer, QuotationMailer,
};
use empaque_store::SqliteCatalogStore;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_list(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("EMPAQUE_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("EMPAQUE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path =
        PathBuf::from(env::var("EMPAQUE_DB_PATH").unwrap_or_else(|_| "empaque.db".to_string()));

    let store = SqliteCatalogStore::open(&db_path)
        .map_err(|e| format!("opening catalog at {}: {e}", db_path.display()))?;

    let images: Arc<dyn ImageHost> = match env::var("EMPAQUE_IMAGE_HOST_URL") {
        Ok(url) if !url.trim().is_empty() => Arc::new(HttpImageHost::new(
            url,
            env::var("EMPAQUE_IMAGE_HOST_KEY").ok(),
            env::var("EMPAQUE_IMAGE_FOLDER").unwrap_or_else(|_| "productos".to_string()),
        )),
        _ => {
            warn!("EMPAQUE_IMAGE_HOST_URL unset; storing image references in memory only");
            Arc::new(InMemoryImageHost::default())
        }
    };
    let mailer: Arc<dyn QuotationMailer> = match env::var("EMPAQUE_MAIL_RELAY_URL") {
        Ok(url) if !url.trim().is_empty() => Arc::new(HttpQuotationMailer::new(
            url,
            env::var("EMPAQUE_MAIL_RELAY_TOKEN").ok(),
        )),
        _ => {
            warn!("EMPAQUE_MAIL_RELAY_URL unset; quotations will be logged, not mailed");
            Arc::new(LogOnlyMailer::default())
        }
    };

    let admin_token = env::var("EMPAQUE_ADMIN_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    if admin_token.is_none() {
        warn!("EMPAQUE_ADMIN_TOKEN unset; admin routes will reject every request");
    }
    let api = ApiConfig {
        admin_token,
        cors_allowed_origins: env_list("EMPAQUE_CORS_ALLOWED_ORIGINS"),
        max_body_bytes: env_usize("EMPAQUE_MAX_BODY_BYTES", 8 * 1024 * 1024),
        enable_audit_log: env_bool("EMPAQUE_AUDIT_LOG", false),
        quotation_recipient: env::var("EMPAQUE_MAIL_TO")
            .unwrap_or_else(|_| "ventas@example.cl".to_string()),
    };

    let state = AppState::new(Arc::new(store), images, mailer, api);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("binding {bind_addr}: {e}"))?;
    info!(addr = %bind_addr, "empaque-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))?;
    info!("shutdown complete");
    Ok(())
}
