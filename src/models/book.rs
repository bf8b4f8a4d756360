//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Owner of the book
    pub user_id: Uuid,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
}

impl CreateBook {
    /// Trim both fields and reject blank values
    pub fn normalized(self) -> Result<Self, AppError> {
        let book = CreateBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
        };
        book.validate()
            .map_err(|_| AppError::Validation("title and author are required".to_string()))?;
        Ok(book)
    }
}

/// Update book request, absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl UpdateBook {
    pub fn normalized(self) -> Result<Self, AppError> {
        let trim = |field: Option<String>, name: &str| -> Result<Option<String>, AppError> {
            match field.map(|v| v.trim().to_string()) {
                Some(v) if v.is_empty() => {
                    Err(AppError::Validation(format!("{} cannot be empty", name)))
                }
                other => Ok(other),
            }
        };

        Ok(UpdateBook {
            title: trim(self.title, "title")?,
            author: trim(self.author, "author")?,
        })
    }
}
