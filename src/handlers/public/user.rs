// handlers/public/user.rs - POST /users/post_user handler

use axum::extract::State;
use serde_json::Value;
use tracing::info;

use crate::api::ApiJson;
use crate::app::AppState;
use crate::database::models::Account;
use crate::database::{Record, Resource};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /users/post_user - create an account without a session
///
/// Input: `{ "username": "string", "email": "string", "password": "string" }`. Unlike
/// `/auth/signup` there is no duplicate pre-check and no token; a taken username or email
/// fails in the store.
pub async fn create_account(State(state): State<AppState>, ApiJson(payload): ApiJson<Value>) -> ApiResult<Account> {
    let record = Record::for_create(Account::descriptor(), &payload)?;
    let account = state.accounts().create(&record, None).await?;
    info!(user_id = account.user_id, "account created");
    Ok(ApiResponse::success("User created successfully.", account))
}
