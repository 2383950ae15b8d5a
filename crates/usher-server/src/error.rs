// ── HTTP boundary errors ──
//
// Every failure a handler can produce. The fetch endpoints render these as
// `{success:false, error}`; the RPC-callable adapter renders them as
// `{error:{status, message}}` using the callable status names.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use usher_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    BadRequest(String),

    /// The request is well-formed but the schedule does not allow it.
    #[error("{0}")]
    Precondition(String),

    #[error("Not found")]
    NotFound,

    /// Decryption of caller-supplied data failed. Carries only a fixed,
    /// user-facing message.
    #[error("{0}")]
    Crypto(&'static str),

    /// Anything else. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Precondition(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Crypto(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status name used by the RPC-callable protocol.
    pub const fn callable_status(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_ARGUMENT",
            Self::Precondition(_) => "FAILED_PRECONDITION",
            Self::NotFound => "NOT_FOUND",
            Self::Crypto(_) | Self::Internal(_) => "INTERNAL",
        }
    }

    /// The message safe to show a caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }

    fn log(&self) {
        if let Self::Internal(detail) = self {
            error!(%detail, "request failed");
        }
    }

    /// Render in the RPC-callable shape.
    pub fn into_callable_response(self) -> Response {
        self.log();
        let body = json!({
            "error": {
                "status": self.callable_status(),
                "message": self.public_message(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = json!({
            "success": false,
            "error": self.public_message(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoActiveService | CoreError::NotScheduled { .. } => {
                Self::Precondition(err.to_string())
            }
            CoreError::InvalidServiceNumber { .. } => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Failures starting or running the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Precondition("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Crypto("nope").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_client_failures() {
        let err = ApiError::from(CoreError::NoActiveService);
        assert_eq!(err.callable_status(), "FAILED_PRECONDITION");

        let err = ApiError::from(CoreError::InvalidServiceNumber { service: 9 });
        assert_eq!(err.callable_status(), "INVALID_ARGUMENT");
        assert_eq!(err.public_message(), "Invalid service number: 9");

        let err = ApiError::from(CoreError::NotScheduled {
            service: 1,
            weekday: Weekday::Mon,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_details_stay_private() {
        let err = ApiError::from(CoreError::Encryption {
            reason: "aead::Error".into(),
        });
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
