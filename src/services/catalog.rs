//! Catalog management service

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::BookStore,
};

use super::{alerts::AlertDispatcher, loans::LoansService};

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStore>,
    ledger: LoansService,
    alerts: AlertDispatcher,
}

impl CatalogService {
    pub fn new(books: Arc<dyn BookStore>, ledger: LoansService, alerts: AlertDispatcher) -> Self {
        Self { books, ledger, alerts }
    }

    /// Store a new book for `owner_id` and alert the owner's subscribers.
    ///
    /// The response does not wait for the alerts, and their failures never
    /// reach the caller.
    pub async fn create_book(&self, owner_id: Uuid, data: CreateBook) -> AppResult<Book> {
        let data = data.normalized()?;
        let book = self.books.create(Uuid::new_v4(), owner_id, &data).await?;

        tracing::info!(book_id = %book.id, %owner_id, "book created");
        drop(self.alerts.on_book_created(&book));

        Ok(book)
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.books
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))
    }

    /// Books owned by a user
    pub async fn list_user_books(&self, user_id: Uuid) -> AppResult<Vec<Book>> {
        self.books.list_by_user(user_id).await
    }

    /// Every book in the catalog
    pub async fn browse_books(&self) -> AppResult<Vec<Book>> {
        self.books.list_all().await
    }

    pub async fn update_book(&self, id: Uuid, owner_id: Uuid, data: UpdateBook) -> AppResult<Book> {
        let data = data.normalized()?;
        self.books
            .update(id, owner_id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))
    }

    /// Delete one of the owner's books. Books out on loan are kept.
    ///
    /// Someone else's book is reported as missing, whatever its loan state.
    pub async fn delete_book(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let owned = self
            .books
            .get(id)
            .await?
            .is_some_and(|book| book.user_id == owner_id);
        if !owned {
            return Err(AppError::NotFound("book not found".to_string()));
        }

        if self.ledger.is_on_loan(id).await? {
            return Err(AppError::Conflict(
                "book is currently issued and cannot be deleted".to_string(),
            ));
        }

        match self.books.delete(id, owner_id).await? {
            0 => Err(AppError::NotFound("book not found".to_string())),
            _ => {
                tracing::info!(book_id = %id, %owner_id, "book deleted");
                Ok(())
            }
        }
    }
}
