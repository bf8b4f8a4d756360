//! API handlers for Co-Library REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod subscriptions;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Caller resolved from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Authentication("Invalid authorization header format".to_string())
            })?;

        let user = state.services.users.authenticate(token).await?;

        Ok(AuthenticatedUser { user_id: user.id })
    }
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse an id taken from the path, `kind` names it in the error message
pub(crate) fn parse_id(raw: &str, kind: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid {} id", kind)))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
        // Accounts
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login))
        // Books
        .route("/books", get(books::list_my_books).post(books::create_book))
        .route("/books/browse", get(books::browse_books))
        .route("/books/browse/:user_id", get(books::browse_user_books))
        .route(
            "/books/:book_id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Lending
        .route("/books/issue/:book_id", post(loans::issue_book))
        .route("/books/return/:loan_id", post(loans::return_book))
        .route("/loans", get(loans::list_my_loans))
        // Subscriptions
        .route("/users/subscribe/:user_id", post(subscriptions::subscribe))
        .route("/users/unsubscribe/:user_id", delete(subscriptions::unsubscribe))
        .route("/users/subscribers", get(subscriptions::list_subscribers))
        .route("/users/subscriptions", get(subscriptions::list_subscriptions))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
