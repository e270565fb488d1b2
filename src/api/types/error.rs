//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{FetchErrorKind, LoaderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    PermissionError,
    NotFoundError,
    UpstreamError,
    TimeoutError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::PermissionError => write!(f, "permission_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::TimeoutError => write!(f, "timeout_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::UpstreamError, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, ApiErrorType::TimeoutError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<LoaderError> for ApiError {
    fn from(err: LoaderError) -> Self {
        let message = err.to_string();

        let api_error = match &err {
            LoaderError::Config { .. } => Self::bad_request(message),
            LoaderError::Fetch { kind, .. } => match kind {
                FetchErrorKind::NotFound => Self::not_found(message),
                FetchErrorKind::AccessDenied => Self::forbidden(message),
                FetchErrorKind::Network | FetchErrorKind::Unknown => Self::bad_gateway(message),
            },
            LoaderError::Stage { .. } => Self::internal(message),
            LoaderError::Partition { .. } => Self::bad_gateway(message),
            LoaderError::DeadlineExceeded { .. } => Self::gateway_timeout(message),
        };

        api_error.with_code(err.kind())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_error(kind: FetchErrorKind) -> ApiError {
        LoaderError::fetch(kind, "docs", "a.pdf", "boom").into()
    }

    #[test]
    fn test_config_error_is_bad_request() {
        let err: ApiError = LoaderError::config("bucketName is required").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.code.as_deref(), Some("config"));
        assert!(err.response.error.message.contains("bucketName is required"));
    }

    #[test]
    fn test_fetch_error_statuses() {
        assert_eq!(fetch_error(FetchErrorKind::NotFound).status, StatusCode::NOT_FOUND);
        assert_eq!(fetch_error(FetchErrorKind::AccessDenied).status, StatusCode::FORBIDDEN);
        assert_eq!(fetch_error(FetchErrorKind::Network).status, StatusCode::BAD_GATEWAY);
        assert_eq!(fetch_error(FetchErrorKind::Unknown).status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_pipeline_error_statuses() {
        let stage: ApiError = LoaderError::stage(
            "a.pdf",
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        let partition: ApiError = LoaderError::partition("/tmp/x/a.pdf", "HTTP 500").into();
        let deadline: ApiError = LoaderError::DeadlineExceeded {
            bucket: "docs".to_string(),
            key: "a.pdf".to_string(),
            timeout_ms: 1000,
        }
        .into();

        assert_eq!(stage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(partition.status, StatusCode::BAD_GATEWAY);
        assert_eq!(deadline.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(deadline.response.error.code.as_deref(), Some("deadline"));
    }

    #[test]
    fn test_error_serialization() {
        let err = fetch_error(FetchErrorKind::AccessDenied);
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("\"type\":\"permission_error\""));
        assert!(json.contains("\"code\":\"fetch\""));
        assert!(json.contains("Failed to download file a.pdf from S3 bucket docs"));
    }
}
