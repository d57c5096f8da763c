// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::TokenError;
use crate::database::manager::DatabaseError;
use crate::database::record::RecordError;

/// HTTP API error; every variant maps to exactly one status code and `errorType`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    UserAlreadyExists(String),

    // 401 Unauthorized
    AuthRequired(String),
    InvalidToken(String),
    WrongPassword(String),

    // 404 Not Found
    NotFound(String),
    AccountNotFound(String),

    // 422 Unprocessable Entity
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 500 Internal Server Error
    TokenDecodeError(String),
    Internal { kind: String, message: String },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UserAlreadyExists(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired(_) | ApiError::InvalidToken(_) | ApiError::WrongPassword(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) | ApiError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TokenDecodeError(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error kind reported to clients as `errorType`
    pub fn error_type(&self) -> &str {
        match self {
            ApiError::UserAlreadyExists(_) => "UserAlreadyExists",
            ApiError::AuthRequired(_) => "AuthRequired",
            ApiError::InvalidToken(_) => "InvalidToken",
            ApiError::WrongPassword(_) => "WrongPassword",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::AccountNotFound(_) => "InvalidUsernameOrEmail",
            ApiError::ValidationError { .. } => "ValidationError",
            ApiError::TokenDecodeError(_) => "TokenDecodeError",
            ApiError::Internal { kind, .. } => kind.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::UserAlreadyExists(msg)
            | ApiError::AuthRequired(msg)
            | ApiError::InvalidToken(msg)
            | ApiError::WrongPassword(msg)
            | ApiError::NotFound(msg)
            | ApiError::AccountNotFound(msg)
            | ApiError::TokenDecodeError(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Internal { message, .. } => message,
        }
    }

    /// Convert to the error envelope `{success, error, errorType}`
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "errorType": self.error_type(),
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

impl ApiError {
    pub fn auth_required() -> Self {
        ApiError::AuthRequired("User is not authenticated.".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Internal {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        let field_errors = err.field().map(|field| {
            let mut field_errors = HashMap::new();
            field_errors.insert(field.to_string(), err.to_string());
            field_errors
        });
        ApiError::validation_error(err.to_string(), field_errors)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                // Internal tool: the raw store message is surfaced to the caller
                let kind = match &sqlx_err {
                    sqlx::Error::Database(_) => "DatabaseError",
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => "ConnectionError",
                    _ => "InternalServerError",
                };
                ApiError::internal(kind, sqlx_err.to_string())
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal("DatabaseError", other.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ExpiredOrInvalid => ApiError::InvalidToken(err.to_string()),
            other => ApiError::TokenDecodeError(format!("Failed to decode token: {}", other)),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
