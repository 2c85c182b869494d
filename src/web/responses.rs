//! HTTP response types and error mapping for the web layer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, StoreError};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Map an application error to a status code and a client-safe message
pub fn error_status(error: &AppError) -> (StatusCode, String) {
    match error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::Store(StoreError::Unavailable { .. }) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Aggregate store unavailable".to_string(),
        ),
        AppError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Aggregate store operation failed".to_string(),
        ),
        AppError::Session(e) => (StatusCode::CONFLICT, e.to_string()),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Configuration error: {}", message),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = error_status(&self);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SessionError;
    use crate::models::SessionState;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&AppError::validation("bad id")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&StoreError::unavailable("down").into()).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_status(
                &SessionError::InvalidTransition {
                    from: SessionState::Closed,
                    to: SessionState::Active,
                }
                .into()
            )
            .0,
            StatusCode::CONFLICT
        );
        let (status, message) = error_status(
            &StoreError::WriteRejected {
                video_id: "v".to_string(),
                message: "secret detail".to_string(),
            }
            .into(),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ApiResponse::error("nope")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "nope");
        assert!(body.get("data").is_none());
    }
}
