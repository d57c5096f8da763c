// handlers/mod.rs - two handler tiers
//
// Public handlers need no identity (/auth/login, /auth/signup, /users/post_user).
// Protected handlers require the identity resolved by the identity middleware and reject
// anonymous callers with AuthRequired.
pub mod protected;
pub mod public;

use serde::Serialize;

use crate::auth::TokenCodec;
use crate::database::models::Account;
use crate::error::ApiError;

/// Token plus account returned by every auth endpoint.
#[derive(Debug, Serialize)]
pub struct AuthResults {
    pub jwt: String,
    pub user: Account,
}

/// Sign a session token for `account`. Failing to sign is a server fault, not a decode error.
pub(crate) fn issue_token(tokens: &TokenCodec, account: &Account) -> Result<String, ApiError> {
    tokens
        .issue(account.user_id, &account.username, &account.email)
        .map_err(|e| {
            tracing::error!(user_id = account.user_id, error = %e, "failed to issue token");
            ApiError::internal("InternalServerError", format!("Failed to issue token: {}", e))
        })
}
