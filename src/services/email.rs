//! Email service used to deliver new book alerts

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Address, SmtpTransport, Transport,
};
use std::time::Duration;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::user::User,
};

/// Outbound messaging capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(
        &self,
        from: &User,
        to: &User,
        subject: &str,
        body: &str,
    ) -> AppResult<()>;
}

/// SMTP delivery through one shared, pooled transport
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    mailer: SmtpTransport,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let mailer = build_transport(&config)?;
        Ok(Self { config, mailer })
    }

    fn build_message(&self, from: &User, to: &User, subject: &str, body: &str) -> AppResult<Message> {
        let relay_address: Address = self
            .config
            .smtp_from
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let app_name = self.config.smtp_from_name.as_deref().unwrap_or("Co-Library");
        let from_mailbox = Mailbox::new(
            Some(format!("{} via {}", from.display_name(), app_name)),
            relay_address,
        );

        let reply_address: Address = from
            .email
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;
        let reply_to = Mailbox::new(Some(from.display_name()), reply_address);

        let to_address: Address = to
            .email
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;
        let to_mailbox = Mailbox::new(Some(to.display_name()), to_address);

        Message::builder()
            .from(from_mailbox)
            .reply_to(reply_to)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

}

fn build_transport(config: &EmailConfig) -> AppResult<SmtpTransport> {
    let mailer_builder = if config.smtp_use_tls {
        SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
    } else {
        SmtpTransport::builder_dangerous(&config.smtp_host)
    }
    .port(config.smtp_port)
    .timeout(Some(Duration::from_secs(config.send_timeout_secs)));

    let mailer_builder = if let (Some(username), Some(password)) =
        (&config.smtp_username, &config.smtp_password)
    {
        mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
    } else {
        mailer_builder
    };

    Ok(mailer_builder.build())
}

#[async_trait]
impl Notifier for EmailService {
    async fn send_notification(
        &self,
        from: &User,
        to: &User,
        subject: &str,
        body: &str,
    ) -> AppResult<()> {
        let email = self.build_message(from, to, subject, body)?;
        // Clones share the connection pool
        let mailer = self.mailer.clone();

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
