use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::database::models::Account;
use crate::error::ApiError;

/// Identity attached to a request by [`identity_middleware`].
///
/// `RequestIdentity(None)` means the request carried no `Authorization` header. A header
/// with another scheme leaves no `RequestIdentity` at all.
#[derive(Clone, Debug)]
pub struct RequestIdentity(pub Option<Account>);

/// Resolves the bearer token of every request into the caller's [`Account`].
///
/// Bad or expired tokens short-circuit with 401 `InvalidToken`; any other failure while
/// decoding or looking up the account short-circuits with 500 `TokenDecodeError`.
pub async fn identity_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION).cloned() else {
        request.extensions_mut().insert(RequestIdentity(None));
        return next.run(request).await;
    };

    let token = match header.to_str().ok().and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) => token.to_string(),
        None => {
            debug!("Authorization header is not a bearer token, passing through");
            return next.run(request).await;
        }
    };

    match resolve_account(&state, &token).await {
        Ok(account) => {
            debug!(user_id = account.user_id, username = %account.username, "resolved request identity");
            request.extensions_mut().insert(RequestIdentity(Some(account)));
            next.run(request).await
        }
        Err(err) => {
            warn!(error = %err, "rejected bearer token");
            err.into_response()
        }
    }
}

async fn resolve_account(state: &AppState, token: &str) -> Result<Account, ApiError> {
    let claims = state.tokens.verify(token)?;

    match state.accounts().find_by_username(&claims.username).await {
        Ok(Some(account)) => Ok(account),
        Ok(None) => Err(ApiError::TokenDecodeError(format!(
            "Failed to decode token: no account named '{}'",
            claims.username
        ))),
        Err(e) => Err(ApiError::TokenDecodeError(format!("Failed to decode token: {}", e))),
    }
}

/// The authenticated caller. Rejects with 401 `AuthRequired` when the request has no identity.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestIdentity>() {
            Some(RequestIdentity(Some(account))) => Ok(CurrentUser(account.clone())),
            _ => Err(ApiError::auth_required()),
        }
    }
}
