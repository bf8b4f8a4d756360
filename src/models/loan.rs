//! Loan (book borrow) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One borrower holding one book between issue and return.
///
/// A loan is active while `returned_at` is `None`. Rows are never deleted,
/// the table doubles as the lending history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    #[serde(rename = "issuedAt")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "returnedAt")]
    pub returned_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Parameters for recording a new loan
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLoan {
    pub id: Uuid,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
}
