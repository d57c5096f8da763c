// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use serde::Deserialize;
use tracing::{info, warn};

use crate::api::ApiJson;
use crate::app::AppState;
use crate::auth::hash_password;
use crate::error::ApiError;
use crate::handlers::{issue_token, AuthResults};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// POST /auth/login - exchange credentials for a session token
///
/// Input: `{ "username_or_email": "string", "password": "string" }`
///
/// Output: `{ "success": true, "message": "...", "results": { "jwt": "...", "user": {...} } }`
///
/// 404 `InvalidUsernameOrEmail` when no account matches, 401 `WrongPassword` when the
/// password digest differs.
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<AuthResults> {
    let account = state
        .accounts()
        .find_by_login(&request.username_or_email)
        .await?
        .ok_or_else(|| {
            warn!(identifier = %request.username_or_email, "login for unknown account");
            ApiError::AccountNotFound(format!("User with {} not found.", request.username_or_email))
        })?;

    if account.password_hash != hash_password(&request.password) {
        warn!(user_id = account.user_id, "login with wrong password");
        return Err(ApiError::WrongPassword("Wrong password.".to_string()));
    }

    let jwt = issue_token(&state.tokens, &account)?;
    info!(user_id = account.user_id, "user logged in");

    Ok(ApiResponse::success(
        format!("Fetched user with id {}", account.user_id),
        AuthResults { jwt, user: account },
    ))
}
