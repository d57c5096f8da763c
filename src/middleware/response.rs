use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the success envelope
/// `{ "success": true, "message": ..., "results": ... }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub results: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(message: impl Into<String>, results: T) -> Self {
        Self {
            message: message.into(),
            results,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(message: impl Into<String>, results: T, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            results,
            status_code: Some(status_code),
        }
    }

    /// Render the envelope as JSON without the HTTP wrapper
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        Ok(json!({
            "success": true,
            "message": self.message,
            "results": serde_json::to_value(&self.results)?,
        }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match self.to_json() {
            Ok(envelope) => (status, Json(envelope)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                crate::error::ApiError::internal("InternalServerError", "Failed to serialize response data")
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
