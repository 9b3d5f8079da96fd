// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidParameter,
    MalformedSizeVariants,
    NotFound,
    Unauthorized,
    Forbidden,
    CorsRejected,
    PayloadTooLarge,
    UpstreamFailure,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::InvalidParameter => "invalid_parameter",
            Self::MalformedSizeVariants => "malformed_size_variants",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::CorsRejected => "cors_rejected",
            Self::PayloadTooLarge => "payload_too_large",
            Self::UpstreamFailure => "upstream_failure",
            Self::Internal => "internal",
        }
    }
}

/// HTTP status for an error code. Lives here so the client crate and the
/// server agree without either depending on the other.
#[must_use]
pub const fn status_for(code: ApiErrorCode) -> u16 {
    match code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::InvalidParameter
        | ApiErrorCode::MalformedSizeVariants => 400,
        ApiErrorCode::Unauthorized => 401,
        ApiErrorCode::Forbidden | ApiErrorCode::CorsRejected => 403,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::UpstreamFailure => 502,
        ApiErrorCode::Internal => 500,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            format!("missing required field: {field}"),
            json!({"field_errors": [{"field": field, "reason": "required"}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_field(field: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            format!("invalid field: {field}"),
            json!({"field_errors": [{"field": field, "reason": reason}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidParameter,
            format!("invalid parameter: {name}"),
            json!({"field_errors": [{"parameter": name, "reason": "invalid", "value": value}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn malformed_size_variants(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::MalformedSizeVariants,
            "sizeVariants is not a valid JSON array of variants",
            json!({"field_errors": [{"field": "sizeVariants", "reason": reason}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            format!("{entity} not found"),
            json!({"id": id}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};
