//! Lending endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::loan::Loan, AppState};

use super::{parse_id, AuthenticatedUser};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/issue/{book_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book issued", body = Loan),
        (status = 400, description = "Invalid book id"),
        (status = 403, description = "Caller owns the book"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is currently issued to another borrower")
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(book_id): Path<String>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let book_id = parse_id(&book_id, "book")?;
    let loan = state.services.loans.issue_book(book_id, caller.user_id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Give a borrowed book back
#[utoipa::path(
    post,
    path = "/books/return/{loan_id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("loan_id" = String, Path, description = "Loan (book borrow) ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 400, description = "Loan not found, not the caller's, or already returned")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(loan_id): Path<String>,
) -> AppResult<Json<Loan>> {
    let loan_id = parse_id(&loan_id, "book borrow")?;
    let loan = state.services.loans.return_book(loan_id, caller.user_id).await?;
    Ok(Json(loan))
}

/// Caller's loans, newest first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active and returned loans", body = Vec<Loan>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.get_user_loans(caller.user_id).await?;
    Ok(Json(loans))
}
