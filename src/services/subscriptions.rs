//! User subscriptions
//!
//! A subscriber follows another user and is alerted whenever that user adds
//! a book.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::subscription::Subscription,
    repository::{SubscriptionStore, UserStore},
};

#[derive(Clone)]
pub struct SubscriptionsService {
    subscriptions: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserStore>,
}

impl SubscriptionsService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, users: Arc<dyn UserStore>) -> Self {
        Self { subscriptions, users }
    }

    /// Make `subscriber_id` follow `user_id`
    pub async fn subscribe(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<Subscription> {
        if user_id == subscriber_id {
            return Err(AppError::BadRequest("cannot subscribe to self".to_string()));
        }

        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        if self.subscriptions.get(user_id, subscriber_id).await?.is_some() {
            return Err(AppError::BadRequest(
                "you are already subscribed to user".to_string(),
            ));
        }

        // A concurrent duplicate slips past the check above and comes back as Conflict
        let subscription = self
            .subscriptions
            .create(Uuid::new_v4(), user_id, subscriber_id)
            .await?;

        tracing::info!(%user_id, %subscriber_id, "subscription created");
        Ok(subscription)
    }

    pub async fn unsubscribe(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<()> {
        match self.subscriptions.delete(user_id, subscriber_id).await? {
            0 => Err(AppError::NotFound("subscription not found".to_string())),
            _ => {
                tracing::info!(%user_id, %subscriber_id, "subscription removed");
                Ok(())
            }
        }
    }

    /// Who follows `user_id`
    pub async fn list_subscribers(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        self.subscriptions.list_subscribers(user_id).await
    }

    /// Whom `subscriber_id` follows
    pub async fn list_subscriptions(&self, subscriber_id: Uuid) -> AppResult<Vec<Subscription>> {
        self.subscriptions.list_subscriptions(subscriber_id).await
    }
}
