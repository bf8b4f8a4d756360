//! New book alerts
//!
//! When a user adds a book, everyone subscribed to them receives an email.
//! Delivery is best effort: the fan-out runs on its own task after the book
//! is stored, one send per subscriber, and failures are only logged. There
//! are no retries, so an alert can be lost if the mail relay is down.

use std::{sync::Arc, time::Duration};

use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::{
    models::{book::Book, user::User},
    repository::{SubscriptionStore, UserStore},
};

use super::email::Notifier;

/// Outcome of one fan-out, used for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AlertDispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    send_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            subscriptions,
            users,
            notifier,
            send_timeout,
        }
    }

    /// Fire-and-forget hook for a freshly created book.
    ///
    /// The returned handle can be dropped; the task keeps running. It yields
    /// `None` when the subscriber list or the owner could not be loaded.
    pub fn on_book_created(&self, book: &Book) -> JoinHandle<Option<DispatchReport>> {
        let dispatcher = self.clone();
        let owner_id = book.user_id;
        let book_id = book.id;
        let title = book.title.clone();

        tokio::spawn(async move { dispatcher.alert_subscribers(book_id, owner_id, &title).await })
    }

    async fn alert_subscribers(
        &self,
        book_id: Uuid,
        owner_id: Uuid,
        title: &str,
    ) -> Option<DispatchReport> {
        let subscribers = match self.subscriptions.subscriber_users(owner_id).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::warn!(%book_id, %owner_id, "failed to get subscribers for new book alert: {}", e);
                return None;
            }
        };

        if subscribers.is_empty() {
            tracing::debug!(%book_id, "no subscribers to alert");
            return Some(DispatchReport::default());
        }

        let sender = match self.users.get_by_id(owner_id).await {
            Ok(Some(sender)) => sender,
            Ok(None) => {
                tracing::warn!(%book_id, %owner_id, "book owner not found, skipping alerts");
                return None;
            }
            Err(e) => {
                tracing::warn!(%book_id, %owner_id, "failed to get book owner details: {}", e);
                return None;
            }
        };

        Some(self.dispatch(title, subscribers, sender).await)
    }

    /// Send one alert per subscriber concurrently and wait for all of them.
    ///
    /// A failed or timed out send only counts against that subscriber.
    pub async fn dispatch(
        &self,
        book_title: &str,
        subscribers: Vec<User>,
        sender: User,
    ) -> DispatchReport {
        let sender = Arc::new(sender);
        let mut sends = JoinSet::new();

        for subscriber in subscribers {
            let notifier = Arc::clone(&self.notifier);
            let sender = Arc::clone(&sender);
            let send_timeout = self.send_timeout;
            let (subject, body) = compose_alert(book_title, &sender, &subscriber);

            sends.spawn(async move {
                let send = notifier.send_notification(&sender, &subscriber, &subject, &body);
                match tokio::time::timeout(send_timeout, send).await {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        tracing::warn!(subscriber_id = %subscriber.id, "failed to send new book alert: {}", e);
                        false
                    }
                    Err(_) => {
                        tracing::warn!(
                            subscriber_id = %subscriber.id,
                            "new book alert timed out after {:?}",
                            send_timeout
                        );
                        false
                    }
                }
            });
        }

        let mut report = DispatchReport {
            attempted: sends.len(),
            ..DispatchReport::default()
        };

        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok(true) => report.delivered += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    tracing::warn!("new book alert task aborted: {}", e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "{} new book alerts sent for \"{}\", {} failed",
            report.delivered,
            book_title,
            report.failed
        );

        report
    }
}

/// Subject and body of the alert sent to `subscriber`
pub fn compose_alert(book_title: &str, sender: &User, subscriber: &User) -> (String, String) {
    let subject = format!("New book from {}", sender.first_name);
    let body = format!(
        "Hi {},\n\n{} just added a new book to their shelf: \"{}\".\n\n\
         Log in to Co-Library to borrow it.\n",
        subscriber.first_name,
        sender.display_name(),
        book_title
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        repository::{MockSubscriptionStore, MockUserStore},
        services::email::MockNotifier,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    fn user(first: &str) -> User {
        User {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: "Reader".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            password: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn book(owner: &User) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: owner.id,
        }
    }

    fn dispatcher(
        subscriptions: MockSubscriptionStore,
        users: MockUserStore,
        notifier: impl Notifier + 'static,
    ) -> AlertDispatcher {
        AlertDispatcher::new(
            Arc::new(subscriptions),
            Arc::new(users),
            Arc::new(notifier),
            Duration::from_secs(5),
        )
    }

    /// Records every recipient and fails for the ones in `failing`
    #[derive(Default)]
    struct RecordingNotifier {
        failing: Vec<Uuid>,
        attempts: Mutex<Vec<Uuid>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_notification(
            &self,
            _from: &User,
            to: &User,
            _subject: &str,
            _body: &str,
        ) -> crate::error::AppResult<()> {
            self.attempts.lock().unwrap().push(to.id);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.contains(&to.id) {
                return Err(AppError::Internal("relay refused".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_compose_alert_mentions_title_and_sender() {
        let sender = user("Ada");
        let subscriber = user("Grace");
        let (subject, body) = compose_alert("Dune", &sender, &subscriber);

        assert_eq!(subject, "New book from Ada");
        assert!(body.starts_with("Hi Grace"));
        assert!(body.contains("Ada Reader"));
        assert!(body.contains("\"Dune\""));
    }

    #[tokio::test]
    async fn test_dispatch_sends_once_per_subscriber() {
        let sender = user("Ada");
        let subscribers = vec![user("Grace"), user("Alan"), user("Barbara"), user("Edsger")];

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_notification()
            .withf(|from, _, subject, _| from.first_name == "Ada" && subject.contains("Ada"))
            .times(4)
            .returning(|_, _, _, _| Ok(()));

        let dispatcher = dispatcher(MockSubscriptionStore::new(), MockUserStore::new(), notifier);
        let report = dispatcher.dispatch("Dune", subscribers, sender).await;

        assert_eq!(
            report,
            DispatchReport {
                attempted: 4,
                delivered: 4,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_one_failed_send_does_not_stop_the_others() {
        let sender = user("Ada");
        let subscribers = vec![user("Grace"), user("Alan"), user("Barbara")];
        let all_ids: Vec<Uuid> = subscribers.iter().map(|u| u.id).collect();

        let notifier = Arc::new(RecordingNotifier {
            failing: vec![subscribers[1].id],
            ..RecordingNotifier::default()
        });

        let dispatcher = AlertDispatcher::new(
            Arc::new(MockSubscriptionStore::new()),
            Arc::new(MockUserStore::new()),
            notifier.clone(),
            Duration::from_secs(5),
        );
        let report = dispatcher.dispatch("Dune", subscribers, sender).await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);

        let mut attempted = notifier.attempts.lock().unwrap().clone();
        let mut expected = all_ids;
        attempted.sort();
        expected.sort();
        assert_eq!(attempted, expected);
    }

    /// Every send waits until all of them have started
    struct RendezvousNotifier {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl Notifier for RendezvousNotifier {
        async fn send_notification(
            &self,
            _from: &User,
            _to: &User,
            _subject: &str,
            _body: &str,
        ) -> crate::error::AppResult<()> {
            self.barrier.wait().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sends_are_in_flight_together() {
        let sender = user("Ada");
        let subscribers = vec![user("Grace"), user("Alan"), user("Barbara"), user("Edsger")];
        let notifier = RendezvousNotifier {
            barrier: tokio::sync::Barrier::new(subscribers.len()),
        };

        let dispatcher = AlertDispatcher::new(
            Arc::new(MockSubscriptionStore::new()),
            Arc::new(MockUserStore::new()),
            Arc::new(notifier),
            Duration::from_secs(30),
        );

        // One at a time, the first send would wait at the barrier forever
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.dispatch("Dune", subscribers, sender),
        )
        .await
        .expect("sends did not run concurrently");

        assert_eq!(report.attempted, 4);
        assert_eq!(report.delivered, 4);
    }

    #[tokio::test]
    async fn test_slow_send_counts_as_failure() {
        let sender = user("Ada");
        let subscribers = vec![user("Grace"), user("Alan")];

        let notifier = RecordingNotifier {
            delay: Some(Duration::from_secs(30)),
            ..RecordingNotifier::default()
        };

        let dispatcher = AlertDispatcher::new(
            Arc::new(MockSubscriptionStore::new()),
            Arc::new(MockUserStore::new()),
            Arc::new(notifier),
            Duration::from_millis(50),
        );
        let report = dispatcher.dispatch("Dune", subscribers, sender).await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_subscriber_lookup_failure_skips_dispatch() {
        let owner = user("Ada");
        let new_book = book(&owner);

        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions
            .expect_subscriber_users()
            .times(1)
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));

        let mut notifier = MockNotifier::new();
        notifier.expect_send_notification().never();

        let dispatcher = dispatcher(subscriptions, MockUserStore::new(), notifier);
        let report = dispatcher.on_book_created(&new_book).await.unwrap();

        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_no_subscribers_means_no_sends() {
        let owner = user("Ada");
        let new_book = book(&owner);

        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions
            .expect_subscriber_users()
            .returning(|_| Ok(Vec::new()));

        let mut users = MockUserStore::new();
        users.expect_get_by_id().never();

        let mut notifier = MockNotifier::new();
        notifier.expect_send_notification().never();

        let dispatcher = dispatcher(subscriptions, users, notifier);
        let report = dispatcher.on_book_created(&new_book).await.unwrap();

        assert_eq!(report, Some(DispatchReport::default()));
    }

    #[tokio::test]
    async fn test_on_book_created_alerts_every_subscriber() {
        let owner = user("Ada");
        let new_book = book(&owner);
        let owner_id = owner.id;
        let subscribers = vec![user("Grace"), user("Alan"), user("Barbara")];
        let failing = subscribers[2].id;

        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions
            .expect_subscriber_users()
            .withf(move |id| *id == owner_id)
            .returning(move |_| Ok(subscribers.clone()));

        let mut users = MockUserStore::new();
        users
            .expect_get_by_id()
            .withf(move |id| *id == owner_id)
            .returning(move |_| Ok(Some(owner.clone())));

        let notifier = RecordingNotifier {
            failing: vec![failing],
            ..RecordingNotifier::default()
        };

        let dispatcher = dispatcher(subscriptions, users, notifier);
        let report = dispatcher.on_book_created(&new_book).await.unwrap();

        assert_eq!(
            report,
            Some(DispatchReport {
                attempted: 3,
                delivered: 2,
                failed: 1
            })
        );
    }
}
