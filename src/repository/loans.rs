//! Loans repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{unique_violation_as_conflict, AppResult},
    models::loan::{CreateLoan, Loan},
};

use super::LoanStore;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    /// Get the unreturned loan of a book, if any
    async fn get_active_for_book(&self, book_id: Uuid) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT * FROM book_borrows WHERE book_id = $1 AND returned_at IS NULL",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Insert a new active loan.
    ///
    /// `uq_book_borrows_active_book` rejects a second active loan for the same
    /// book, which surfaces here as `AppError::Conflict`.
    async fn create(&self, loan: &CreateLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO book_borrows (id, book_id, borrower_id, issued_at, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.book_id)
        .bind(loan.borrower_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unique_violation_as_conflict(e, "book is currently issued to another borrower")
        })
    }

    /// Close an active loan held by `borrower_id`
    async fn mark_returned(&self, loan_id: Uuid, borrower_id: Uuid) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE book_borrows
            SET returned_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND borrower_id = $2 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(borrower_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Loan history of a borrower, newest first
    async fn list_by_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM book_borrows WHERE borrower_id = $1 ORDER BY issued_at DESC",
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}
