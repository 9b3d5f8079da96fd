// SPDX-License-Identifier: Apache-2.0

/// Runtime knobs for the HTTP surface. Populated from `EMPAQUE_*`
/// environment variables in `main`; tests build one directly.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bearer token admin routes require. `None` means admin is disabled
    /// and every admin request gets 403.
    pub admin_token: Option<String>,
    /// Exact-match origin allow-list. Empty means no cross-origin access.
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub enable_audit_log: bool,
    /// Address the quotation mail goes to.
    pub quotation_recipient: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            cors_allowed_origins: Vec::new(),
            max_body_bytes: 8 * 1024 * 1024,
            enable_audit_log: false,
            quotation_recipient: "ventas@example.cl".to_string(),
        }
    }
}
