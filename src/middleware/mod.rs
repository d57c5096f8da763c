pub mod auth;
pub mod response;

pub use auth::{identity_middleware, CurrentUser, RequestIdentity};
pub use response::{ApiResponse, ApiResult};
