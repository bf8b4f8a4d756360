//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, subscriptions, users, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Co-Library API",
        version = "1.0.0",
        description = "Book sharing between neighbours: shelves, loans and new book alerts"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::ping,
        health::health_check,
        // Accounts
        users::register,
        users::login,
        // Books
        books::create_book,
        books::list_my_books,
        books::browse_books,
        books::browse_user_books,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::issue_book,
        loans::return_book,
        loans::list_my_loans,
        // Subscriptions
        subscriptions::subscribe,
        subscriptions::unsubscribe,
        subscriptions::list_subscribers,
        subscriptions::list_subscriptions,
    ),
    components(
        schemas(
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::loan::Loan,
            crate::models::subscription::Subscription,
            health::HealthResponse,
            MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration and login"),
        (name = "books", description = "Book catalog"),
        (name = "loans", description = "Issuing and returning books"),
        (name = "subscriptions", description = "Following other users")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
