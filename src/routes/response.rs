use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::routes::constants::MSG_RATE_LIMITED;
use crate::telemetry::error_chain_fmt;

/// Uniform `{success, message?, data?}` envelope returned by every endpoint.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ApiResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn data(data: impl Into<String>) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),
    /// The requested record does not exist (or the caller may not know
    /// whether it does).
    #[error("{0}")]
    NotFound(String),
    #[error("{}", MSG_RATE_LIMITED)]
    RateLimited,
    /// Store or transport failure. `message` is what the caller sees; the
    /// full chain is only ever logged.
    #[error("{message}")]
    Unexpected {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// Wraps an internal failure. The caller-visible message is the
    /// underlying error chain when details may be exposed (local runs),
    /// otherwise the route's fallback text.
    pub fn unexpected(source: anyhow::Error, fallback: &str, expose_detail: bool) -> Self {
        let message = if expose_detail {
            format!("{:#}", source)
        } else {
            fallback.to_string()
        };
        Self::Unexpected { message, source }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("{:?}", self);
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
