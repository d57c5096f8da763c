// handlers/public/auth/signup.rs - POST /auth/signup handler

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiJson;
use crate::app::AppState;
use crate::database::models::Account;
use crate::database::{Record, Resource};
use crate::error::ApiError;
use crate::handlers::{issue_token, AuthResults};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /auth/signup - register an account and return a session token for it
///
/// Input: `{ "username": "string", "email": "string", "password": "string" }`
///
/// 400 `UserAlreadyExists` when the username or the email is taken.
pub async fn signup(State(state): State<AppState>, ApiJson(request): ApiJson<SignupRequest>) -> ApiResult<AuthResults> {
    let payload = serde_json::to_value(&request).map_err(|e| ApiError::validation_error(e.to_string(), None))?;
    let record = Record::for_create(Account::descriptor(), &payload)?;

    let accounts = state.accounts();
    if accounts.exists(&request.username, &request.email).await? {
        warn!(username = %request.username, "signup for existing username or email");
        return Err(ApiError::UserAlreadyExists("Username or email already exists.".to_string()));
    }

    let account = accounts.create(&record, None).await?;
    let jwt = issue_token(&state.tokens, &account)?;
    info!(user_id = account.user_id, "account created");

    Ok(ApiResponse::success(
        format!("User created with id {}", account.user_id),
        AuthResults { jwt, user: account },
    ))
}
