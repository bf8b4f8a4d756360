//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    AppState,
};

use super::{parse_id, AuthenticatedUser, MessageResponse};

/// Add a book to the caller's shelf
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Title or author missing"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(data): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(caller.user_id, data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Books owned by the caller
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_books(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_user_books(caller.user_id).await?;
    Ok(Json(books))
}

/// Every book shared on the platform
#[utoipa::path(
    get,
    path = "/books/browse",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn browse_books(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.browse_books().await?;
    Ok(Json(books))
}

/// Books owned by another user
#[utoipa::path(
    get,
    path = "/books/browse/{user_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = String, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "The user's books", body = Vec<Book>),
        (status = 400, description = "Invalid user id")
    )
)]
pub async fn browse_user_books(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let user_id = parse_id(&user_id, "user")?;
    let books = state.services.catalog.list_user_books(user_id).await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Invalid book id"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(book_id): Path<String>,
) -> AppResult<Json<Book>> {
    let book_id = parse_id(&book_id, "book")?;
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// Edit one of the caller's books
#[utoipa::path(
    patch,
    path = "/books/{book_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book id or empty field"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(book_id): Path<String>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book_id = parse_id(&book_id, "book")?;
    let book = state
        .services
        .catalog
        .update_book(book_id, caller.user_id, data)
        .await?;
    Ok(Json(book))
}

/// Remove one of the caller's books
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is out on loan or has lending history")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let book_id = parse_id(&book_id, "book")?;
    state
        .services
        .catalog
        .delete_book(book_id, caller.user_id)
        .await?;
    Ok(Json(MessageResponse::new("book deleted")))
}
