//! Repository layer for database operations
//!
//! Services never talk to the pool directly. They receive the store traits
//! below, which the PostgreSQL repositories implement and tests replace with
//! mocks or in-memory fakes.

pub mod books;
pub mod loans;
pub mod subscriptions;
pub mod users;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        loan::{CreateLoan, Loan},
        subscription::Subscription,
        user::{NewUser, User},
    },
};

/// Book persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Book>>;

    async fn list_all(&self) -> AppResult<Vec<Book>>;

    async fn create(&self, id: Uuid, owner_id: Uuid, data: &CreateBook) -> AppResult<Book>;

    /// `None` when no book with this id belongs to `owner_id`
    async fn update(&self, id: Uuid, owner_id: Uuid, data: &UpdateBook) -> AppResult<Option<Book>>;

    /// Returns the number of deleted rows
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<u64>;
}

/// Loan persistence.
///
/// Implementations must guarantee that at most one unreturned loan exists per
/// book and report a violation from `create` as `AppError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn get_active_for_book(&self, book_id: Uuid) -> AppResult<Option<Loan>>;

    async fn create(&self, loan: &CreateLoan) -> AppResult<Loan>;

    /// Sets `returned_at` on the loan matching id, borrower and still active.
    /// `None` covers all three mismatches.
    async fn mark_returned(&self, loan_id: Uuid, borrower_id: Uuid) -> AppResult<Option<Loan>>;

    async fn list_by_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<Loan>>;
}

/// Subscription persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<Option<Subscription>>;

    async fn create(&self, id: Uuid, user_id: Uuid, subscriber_id: Uuid) -> AppResult<Subscription>;

    async fn delete(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<u64>;

    /// Subscriptions in which `user_id` is the followed party
    async fn list_subscribers(&self, user_id: Uuid) -> AppResult<Vec<Subscription>>;

    /// Subscriptions in which `subscriber_id` is the follower
    async fn list_subscriptions(&self, subscriber_id: Uuid) -> AppResult<Vec<Subscription>>;

    /// Full user records of everyone following `user_id`
    async fn subscriber_users(&self, user_id: Uuid) -> AppResult<Vec<User>>;
}

/// User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: &NewUser) -> AppResult<User>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
    pub subscriptions: subscriptions::SubscriptionsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            subscriptions: subscriptions::SubscriptionsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
