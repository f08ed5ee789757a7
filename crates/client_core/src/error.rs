use std::time::Duration;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("api responded {status} ({code:?}): {message}", code = .error.code, message = .error.message)]
    Api { status: u16, error: ApiError },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ClientError {
    pub fn api(status: u16, error: ApiError) -> Self {
        Self::Api { status, error }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::api(404, ApiError::new(ErrorCode::NotFound, message))
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { error, .. } => Some(error.code),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
