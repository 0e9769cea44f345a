// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::identity::IdentityError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 502 Bad Gateway (identity API issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            // Upstream messages reach the caller verbatim
            IdentityError::Rejected { status, message } => match status {
                401 => ApiError::unauthorized(message),
                403 => ApiError::forbidden(message),
                400..=499 => ApiError::bad_request(message),
                _ => {
                    tracing::error!("Identity API failed with {}: {}", status, message);
                    ApiError::bad_gateway(message)
                }
            },
            IdentityError::MissingRole => ApiError::forbidden(err.to_string()),
            IdentityError::Timeout | IdentityError::Transport(_) => {
                tracing::error!("Identity API unavailable: {}", err);
                ApiError::service_unavailable("Identity service temporarily unavailable")
            }
            IdentityError::Decode(msg) => {
                tracing::error!("Identity API decode error: {}", msg);
                ApiError::bad_gateway("Unexpected response from identity service")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_upstream_message() {
        let err = ApiError::from(IdentityError::Rejected {
            status: 400,
            message: "Invalid identifier or password".to_string(),
        });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid identifier or password");
        assert_eq!(err.to_json()["message"], "Invalid identifier or password");
    }

    #[test]
    fn test_transport_failures_are_unavailable() {
        assert_eq!(ApiError::from(IdentityError::Timeout).status_code(), 503);
        assert_eq!(
            ApiError::from(IdentityError::Transport("refused".into())).status_code(),
            503
        );
        assert_eq!(ApiError::from(IdentityError::MissingRole).status_code(), 403);
    }
}
