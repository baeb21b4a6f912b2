use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::error::{AppError, Result};

/// SMTP sender for out-of-band notices (artist application decisions).
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Returns None when email is disabled or not fully configured.
    pub fn from_config(config: &EmailConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let host = config.smtp_host.as_deref()?;
        let username = config.smtp_username.clone()?;
        let password = config.smtp_password.clone()?;
        let from = config.from_address.as_deref()?.parse().ok()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .ok()?
            .credentials(Credentials::new(username, password))
            .build();

        Some(Self { transport, from })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::External(format!("SMTP error: {}", e)))?;

        Ok(())
    }

    /// Fire-and-forget variant: failures are logged, never surfaced.
    pub async fn send_best_effort(&self, to: &str, subject: &str, body: &str) {
        if let Err(e) = self.send(to, subject, body).await {
            tracing::warn!("email to {} failed: {:?}", to, e);
        }
    }
}
