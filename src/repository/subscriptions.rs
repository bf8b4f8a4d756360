//! User subscriptions repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{unique_violation_as_conflict, AppResult},
    models::{subscription::Subscription, user::User},
};

use super::SubscriptionStore;

#[derive(Clone)]
pub struct SubscriptionsRepository {
    pool: Pool<Postgres>,
}

impl SubscriptionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionsRepository {
    async fn get(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM user_subscribers WHERE user_id = $1 AND subscriber_id = $2",
        )
        .bind(user_id)
        .bind(subscriber_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subscription)
    }

    async fn create(&self, id: Uuid, user_id: Uuid, subscriber_id: Uuid) -> AppResult<Subscription> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO user_subscribers (id, created_at, updated_at, user_id, subscriber_id)
            VALUES ($1, NOW(), NOW(), $2, $3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(subscriber_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, "you are already subscribed to user"))
    }

    async fn delete(&self, user_id: Uuid, subscriber_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("DELETE FROM user_subscribers WHERE user_id = $1 AND subscriber_id = $2")
                .bind(user_id)
                .bind(subscriber_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn list_subscribers(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM user_subscribers WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_subscriptions(&self, subscriber_id: Uuid) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM user_subscribers WHERE subscriber_id = $1 ORDER BY created_at",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn subscriber_users(&self, user_id: Uuid) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM users u
            JOIN user_subscribers us ON us.subscriber_id = u.id
            WHERE us.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
