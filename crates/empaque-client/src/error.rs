// SPDX-License-Identifier: Apache-2.0

use empaque_api::ApiError;
use empaque_model::ParseError;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// Transport-level failure before any API answer arrived.
    Http(reqwest::Error),
    /// The server answered with its error envelope.
    Api { status: u16, error: ApiError },
    /// The request was rejected locally, before going on the wire.
    Validation(ParseError),
    /// Non-success status whose body was not the error envelope.
    UnexpectedStatus(u16),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http transport error: {e}"),
            Self::Api { status, error } => write!(f, "api error (status {status}): {error}"),
            Self::Validation(e) => write!(f, "local validation failed: {e}"),
            Self::UnexpectedStatus(status) => write!(f, "unexpected status {status}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Api { error, .. } => Some(error),
            Self::Validation(e) => Some(e),
            Self::UnexpectedStatus(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<ParseError> for ClientError {
    fn from(e: ParseError) -> Self {
        Self::Validation(e)
    }
}
