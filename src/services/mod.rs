//! Business logic services

pub mod alerts;
pub mod catalog;
pub mod email;
pub mod loans;
pub mod subscriptions;
pub mod users;

use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    error::AppResult,
    repository::{BookStore, LoanStore, Repository, SubscriptionStore, UserStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub subscriptions: subscriptions::SubscriptionsService,
}

impl Services {
    /// Create all services backed by PostgreSQL and SMTP
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let mailer = email::EmailService::new(config.email.clone())?;
        Ok(Self::with_stores(
            Arc::new(repository.books),
            Arc::new(repository.loans),
            Arc::new(repository.subscriptions),
            Arc::new(repository.users),
            Arc::new(mailer),
            config,
        ))
    }

    /// Wire services over arbitrary store and notifier implementations
    pub fn with_stores(
        books: Arc<dyn BookStore>,
        loans: Arc<dyn LoanStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn email::Notifier>,
        config: &AppConfig,
    ) -> Self {
        let alerts = alerts::AlertDispatcher::new(
            subscriptions.clone(),
            users.clone(),
            notifier,
            Duration::from_secs(config.email.send_timeout_secs),
        );

        let ledger = loans::LoansService::new(books.clone(), loans);

        Self {
            users: users::UsersService::new(users.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(books, ledger.clone(), alerts),
            loans: ledger,
            subscriptions: subscriptions::SubscriptionsService::new(subscriptions, users),
        }
    }
}
