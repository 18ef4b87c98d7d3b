use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cms::CmsError;
use domain::DomainError;
use thiserror::Error;
use tracing::{error, warn};

/// Every handler failure ends here and leaves as `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The CMS failed; `message` is what the user sees, `source` is logged.
    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: CmsError,
    },
}

impl ApiError {
    pub fn upstream(message: impl Into<String>, source: CmsError) -> Self {
        ApiError::Upstream {
            message: message.into(),
            source,
        }
    }

    /// Like `upstream`, but a CMS error message wins over `fallback`.
    pub fn relay(fallback: &str, source: CmsError) -> Self {
        let message = source
            .upstream_message()
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Upstream { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream { message, source } => {
                error!("{}: {}", message, source);
            }
            other => warn!("Request rejected ({}): {}", other.status(), other),
        }

        let status = self.status();
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}
