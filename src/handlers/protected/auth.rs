// handlers/protected/auth.rs - GET /auth/auth handler

use axum::{extract::State, http::header::AUTHORIZATION, http::HeaderMap};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::AuthResults;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /auth/auth - resolve the bearer token back to its account
///
/// The account is looked up by the token's email claim. The response carries an empty
/// `jwt`; the caller keeps using the token it sent.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<AuthResults> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(ApiError::auth_required)?;

    let claims = state.tokens.verify(token)?;
    debug!(email = %claims.email, "verifying session token");

    let account = state
        .accounts()
        .find_by_email(&claims.email)
        .await?
        .ok_or_else(|| ApiError::AccountNotFound(format!("User with {} not found.", claims.username)))?;

    Ok(ApiResponse::success(
        format!("Fetched user with id {}", account.user_id),
        AuthResults {
            jwt: String::new(),
            user: account,
        },
    ))
}
