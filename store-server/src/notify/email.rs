//! SMTP email sender (lettre async transport)

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::NotifyError;
use crate::core::config::SmtpConfig;

#[derive(Clone)]
pub struct EmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailSender {
    /// None when SMTP is not configured; the notifier degrades gracefully.
    pub fn from_config(config: &SmtpConfig) -> Option<Self> {
        let host = config.host.as_ref()?;
        let username = config.username.as_ref()?;
        let password = config.password.as_ref()?;
        let from = config.from.clone()?;

        let creds = Credentials::new(username.clone(), password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .ok()?
            .port(config.port)
            .credentials(creds)
            .build();

        Some(Self { transport, from })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::Send(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::Send(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Send(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Send(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}
