use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::sheet::SheetError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error (missing sheet id, unset login secret)
    ConfigError(String),
    /// Malformed request
    BadRequest(String),
    /// Authentication error
    Unauthorized(String),
    /// No sheet row matches the requested model
    ModelNotFound(String),
    /// Spreadsheet export could not be read
    SheetUnavailable(String),
    /// Internal server error
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::ModelNotFound(_) => StatusCode::NOT_FOUND,
            Self::SheetUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client
    fn public_message(&self) -> String {
        match self {
            Self::ModelNotFound(_) => "Model not found".to_string(),
            Self::ConfigError(msg)
            | Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::SheetUnavailable(msg)
            | Self::InternalError(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::ModelNotFound(model) => write!(f, "Model not found: {}", model),
            Self::SheetUnavailable(msg) => write!(f, "Sheet unavailable: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, error_type = error_type_name(&self), "Request failed");
        } else {
            tracing::debug!(error = %self, error_type = error_type_name(&self), "Request rejected");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::BadRequest(_) => "bad_request",
        AppError::Unauthorized(_) => "unauthorized",
        AppError::ModelNotFound(_) => "model_not_found",
        AppError::SheetUnavailable(_) => "sheet_unavailable",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<SheetError> for AppError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::MissingSheetId => Self::ConfigError(err.to_string()),
            other => Self::SheetUnavailable(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let error = AppError::ModelNotFound("DUKE R10".to_string());
        assert_eq!(error.to_string(), "Model not found: DUKE R10");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name(&AppError::Unauthorized("test".to_string())), "unauthorized");
        assert_eq!(error_type_name(&AppError::ModelNotFound("test".to_string())), "model_not_found");
    }

    #[test]
    fn test_sheet_error_conversion() {
        assert!(matches!(
            AppError::from(SheetError::MissingSheetId),
            AppError::ConfigError(_)
        ));
        assert!(matches!(
            AppError::from(SheetError::SharingNotEnabled),
            AppError::SheetUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_not_found_response_hides_query() {
        let response = AppError::ModelNotFound("UNKNOWN".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({ "error": "Model not found" }));
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = AppError::Unauthorized("Not logged in".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::from(SheetError::SharingNotEnabled).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Anyone with the link"));
    }
}
