//! Book lending service
//!
//! Each book has one physical copy and is either available or on loan.
//! `issue_book` moves it to on-loan, `return_book` moves it back. The
//! availability check in `issue_book` only gives an early, friendly answer:
//! two requests can pass it at the same time, and the store's one-active-loan
//! constraint decides which one wins. The loser gets `Conflict`.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan},
    repository::{BookStore, LoanStore},
};

#[derive(Clone)]
pub struct LoansService {
    books: Arc<dyn BookStore>,
    loans: Arc<dyn LoanStore>,
}

impl LoansService {
    pub fn new(books: Arc<dyn BookStore>, loans: Arc<dyn LoanStore>) -> Self {
        Self { books, loans }
    }

    /// Lend a book to `borrower_id`.
    ///
    /// Checks run in a fixed order: the book must exist (`NotFound`), the
    /// borrower must not own it (`Authorization`), and it must not be on loan
    /// (`Conflict`).
    pub async fn issue_book(&self, book_id: Uuid, borrower_id: Uuid) -> AppResult<Loan> {
        let book = self
            .books
            .get(book_id)
            .await
            .map_err(|e| e.into_internal("failed to get book details"))?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;

        if book.user_id == borrower_id {
            return Err(AppError::Authorization(
                "you cannot borrow your own book".to_string(),
            ));
        }

        let active = self
            .loans
            .get_active_for_book(book.id)
            .await
            .map_err(|e| e.into_internal("error issuing book"))?;

        if active.is_some() {
            return Err(AppError::Conflict(
                "book is currently issued to another borrower".to_string(),
            ));
        }

        let new_loan = CreateLoan {
            id: Uuid::new_v4(),
            book_id: book.id,
            borrower_id,
        };

        let loan = self.loans.create(&new_loan).await.map_err(|e| match e {
            AppError::Conflict(msg) => {
                tracing::warn!(%book_id, %borrower_id, "concurrent issue rejected by store");
                AppError::Conflict(msg)
            }
            other => other.into_internal("error issuing book"),
        })?;

        tracing::info!(loan_id = %loan.id, %book_id, %borrower_id, "book issued");
        Ok(loan)
    }

    /// Close the caller's active loan.
    ///
    /// An unknown id, a loan held by someone else and an already returned
    /// loan all produce the same `BadRequest`, so callers learn nothing about
    /// loans they do not hold.
    pub async fn return_book(&self, loan_id: Uuid, borrower_id: Uuid) -> AppResult<Loan> {
        let loan = self
            .loans
            .mark_returned(loan_id, borrower_id)
            .await
            .map_err(|e| e.into_internal("failed to return book"))?
            .ok_or_else(|| {
                AppError::BadRequest(
                    "failed to return book: record not found, unauthorized, or already returned"
                        .to_string(),
                )
            })?;

        tracing::info!(%loan_id, book_id = %loan.book_id, %borrower_id, "book returned");
        Ok(loan)
    }

    /// Loan history of a borrower
    pub async fn get_user_loans(&self, borrower_id: Uuid) -> AppResult<Vec<Loan>> {
        self.loans.list_by_borrower(borrower_id).await
    }

    /// Whether a book currently has an unreturned loan
    pub async fn is_on_loan(&self, book_id: Uuid) -> AppResult<bool> {
        Ok(self.loans.get_active_for_book(book_id).await?.is_some())
    }
}
