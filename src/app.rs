use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::models::{Account, Budget, Expense, Income, SavingsGoal, Transaction};
use crate::database::{DatabaseManager, Repository, Resource};
use crate::handlers::{protected, public};
use crate::middleware::identity_middleware;

/// Shared per-process state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DatabaseManager,
    pub tokens: TokenCodec,
    /// Browser origins allowed by the CORS layer; empty allows none.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(db: DatabaseManager, tokens: TokenCodec) -> Self {
        Self {
            db,
            tokens,
            cors_origins: Vec::new(),
        }
    }

    pub fn from_config(db: DatabaseManager, config: &AppConfig) -> Self {
        Self::new(db, TokenCodec::from_config(&config.security))
            .with_cors_origins(config.security.cors_origins.clone())
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn repository<T: Resource>(&self) -> Repository<T> {
        Repository::new(self.db.pool().clone())
    }

    pub fn accounts(&self) -> Repository<Account> {
        self.repository()
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        // Resources
        .nest("/users", user_routes())
        .nest("/income", resource_routes::<Income>())
        .nest("/expense", resource_routes::<Expense>())
        .nest("/transaction", resource_routes::<Transaction>())
        .nest("/budget", resource_routes::<Budget>())
        .nest("/savings_goals", resource_routes::<SavingsGoal>())
        // Identity runs before every route; handlers decide whether they need it
        .layer(middleware::from_fn_with_state(state.clone(), identity_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(public::auth::login))
        .route("/signup", post(public::auth::signup))
        .route("/auth", get(protected::auth::verify))
}

/// The five CRUD routes, named after the resource: `get_income/:id`, `get_incomes`, ...
fn resource_routes<T: Resource>() -> Router<AppState> {
    let d = T::descriptor();

    Router::new()
        .route(&format!("/get_{}/:id", d.singular), get(protected::resource::get_one::<T>))
        .route(&format!("/get_{}", d.plural), get(protected::resource::get_many::<T>))
        .route(&format!("/get_all_{}", d.plural), get(protected::resource::get_all::<T>))
        .route(&format!("/post_{}", d.singular), post(protected::resource::create::<T>))
        .route(&format!("/put_{}", d.singular), put(protected::resource::update::<T>))
        .route(&format!("/delete_{}/:id", d.singular), delete(protected::resource::delete::<T>))
}

/// Accounts share the generic routes except creation, which needs no identity.
fn user_routes() -> Router<AppState> {
    let d = Account::descriptor();

    Router::new()
        .route(&format!("/get_{}/:id", d.singular), get(protected::resource::get_one::<Account>))
        .route(&format!("/get_{}", d.plural), get(protected::resource::get_many::<Account>))
        .route(&format!("/get_all_{}", d.plural), get(protected::resource::get_all::<Account>))
        .route(&format!("/post_{}", d.singular), post(public::user::create_account))
        .route(&format!("/put_{}", d.singular), put(protected::resource::update::<Account>))
        .route(&format!("/delete_{}/:id", d.singular), delete(protected::resource::delete::<Account>))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Finance API",
        "results": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/signup (public), /auth/auth (bearer)",
                "users": "/users/* (bearer, except post_user)",
                "income": "/income/* (bearer)",
                "expense": "/expense/* (bearer)",
                "transaction": "/transaction/* (bearer)",
                "budget": "/budget/* (bearer)",
                "savings_goals": "/savings_goals/* (bearer)",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "ok",
                "results": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": format!("database unavailable: {}", e),
                "errorType": "DatabaseError"
            })),
        ),
    }
}
