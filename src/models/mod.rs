//! Data models for Co-Library

pub mod book;
pub mod loan;
pub mod subscription;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, UpdateBook};
pub use loan::{CreateLoan, Loan};
pub use subscription::Subscription;
pub use user::{User, UserClaims};
