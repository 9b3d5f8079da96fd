// SPDX-License-Identifier: Apache-2.0

//! Hosted product images.
//!
//! Uploads go out as base64 data URIs, the shape the hosting API accepts
//! from browser admin panels; deletes are keyed by the `public_id` the host
//! returned at upload time.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug)]
pub struct ImageHostError(pub String);

impl Display for ImageHostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "image host error: {}", self.0)
    }
}

impl std::error::Error for ImageHostError {}

#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<HostedImage, ImageHostError>;
    async fn delete(&self, public_id: &str) -> Result<(), ImageHostError>;
}

/// Recovers a `public_id` from a hosted image URL, for rows that predate
/// the column: the id is the last two path segments (`folder/stem`) with
/// the file extension dropped.
#[must_use]
pub fn public_id_from_url(url: &str) -> Option<String> {
    let without_query = url.split('?').next()?;
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    let mut parts = after_scheme.split('/');
    let _host = parts.next()?;
    let path: Vec<&str> = parts.collect();
    // Need at least folder/file below the host.
    if path.len() < 2 {
        return None;
    }
    let file = *path.last()?;
    let folder = path[path.len() - 2];
    if file.is_empty() || folder.is_empty() {
        return None;
    }
    let stem = file.rsplit_once('.').map_or(file, |(s, _)| s);
    if stem.is_empty() {
        return None;
    }
    Some(format!("{folder}/{stem}"))
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Talks to a Cloudinary-style upload API over HTTPS.
pub struct HttpImageHost {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    folder: String,
}

impl HttpImageHost {
    #[must_use]
    pub fn new(base_url: String, api_key: Option<String>, folder: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            folder,
        }
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<HostedImage, ImageHostError> {
        let data_uri = format!("data:{content_type};base64,{}", BASE64.encode(bytes));
        let body = serde_json::json!({
            "file": data_uri,
            "folder": self.folder,
            "filename": filename,
        });
        let resp = self
            .authorized(self.client.post(format!("{}/image/upload", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageHostError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ImageHostError(format!(
                "upload returned status {}",
                resp.status()
            )));
        }
        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| ImageHostError(e.to_string()))?;
        Ok(HostedImage {
            url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageHostError> {
        let body = serde_json::json!({"public_id": public_id});
        let resp = self
            .authorized(
                self.client
                    .post(format!("{}/image/destroy", self.base_url)),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| ImageHostError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ImageHostError(format!(
                "destroy returned status {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// In-process host for development and tests. Records every call so tests
/// can assert on upload and delete traffic.
#[derive(Default)]
pub struct InMemoryImageHost {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_uploads: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl ImageHost for InMemoryImageHost {
    async fn upload(
        &self,
        filename: &str,
        _content_type: &str,
        _bytes: &[u8],
    ) -> Result<HostedImage, ImageHostError> {
        if self.fail_uploads.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(ImageHostError("host unavailable".to_string()));
        }
        let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
        let public_id = format!("productos/{stem}");
        self.uploads.lock().await.push(public_id.clone());
        Ok(HostedImage {
            url: format!("https://images.local/{public_id}.png"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageHostError> {
        self.deletes.lock().await.push(public_id.to_string());
        Ok(())
    }
}
