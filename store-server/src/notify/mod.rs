//! Notification dispatch
//!
//! Order confirmations and cart-recovery messages. The storefront path uses
//! `dispatch`: the send is spawned, its failure lands in the structured log,
//! and the triggering request never waits on it. Admin recovery uses
//! `deliver` and surfaces failures inline.

mod email;
mod whatsapp;

pub use email::EmailSender;
pub use whatsapp::WhatsAppClient;

use shared::models::Order;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Channel not configured: {0}")]
    Config(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Missing recipient: {0}")]
    NoRecipient(String),
}

/// Recovery channel requested by the admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryChannel {
    Whatsapp,
    Email,
}

/// A unit of notification work
#[derive(Debug, Clone)]
pub enum NotifyTask {
    /// Post-confirmation order email/WhatsApp to the customer
    OrderConfirmation { order: Order },
    /// Cart-recovery nudge with a resume link
    Recovery {
        channel: RecoveryChannel,
        to: String,
        customer_name: String,
        total: f64,
        resume_link: String,
    },
}

#[derive(Clone, Default)]
pub struct Notifier {
    email: Option<EmailSender>,
    whatsapp: Option<WhatsAppClient>,
}

impl Notifier {
    pub fn new(email: Option<EmailSender>, whatsapp: Option<WhatsAppClient>) -> Self {
        Self { email, whatsapp }
    }

    /// No-channel notifier for tests and bare dev environments
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Fire-and-forget send. Failures are logged, never propagated; the
    /// caller's response does not wait on the send.
    pub fn dispatch(&self, task: NotifyTask) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(task).await {
                tracing::warn!(target: "notify", error = %e, "Best-effort notification failed");
            }
        });
    }

    /// Awaited send for admin-triggered messages
    pub async fn deliver(&self, task: NotifyTask) -> Result<(), NotifyError> {
        match task {
            NotifyTask::OrderConfirmation { order } => self.send_confirmation(&order).await,
            NotifyTask::Recovery {
                channel,
                to,
                customer_name,
                total,
                resume_link,
            } => {
                self.send_recovery(channel, &to, &customer_name, total, &resume_link)
                    .await
            }
        }
    }

    async fn send_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        let email = self
            .email
            .as_ref()
            .ok_or_else(|| NotifyError::Config("email transport not configured".into()))?;
        let to = order
            .customer_email
            .as_deref()
            .ok_or_else(|| NotifyError::NoRecipient(format!("order {} has no email", order.id)))?;

        let number = order
            .order_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| order.id.to_string());
        let subject = format!("Order #{number} confirmed");
        let body = format!(
            "Hi {},\n\nThanks for your order #{number}! We're getting it ready.\nOrder total: Rs. {:.2}\n\nThe Petal Team",
            order.customer_name, order.total
        );
        email.send(to, &subject, &body).await
    }

    async fn send_recovery(
        &self,
        channel: RecoveryChannel,
        to: &str,
        customer_name: &str,
        total: f64,
        resume_link: &str,
    ) -> Result<(), NotifyError> {
        let name = if customer_name.is_empty() {
            "there"
        } else {
            customer_name
        };
        let text = format!(
            "Hi {name}, you left items worth Rs. {total:.2} in your cart. Complete your order here: {resume_link}"
        );

        match channel {
            RecoveryChannel::Whatsapp => {
                let whatsapp = self.whatsapp.as_ref().ok_or_else(|| {
                    NotifyError::Config("WhatsApp transport not configured".into())
                })?;
                whatsapp.send_text(to, &text).await
            }
            RecoveryChannel::Email => {
                let email = self
                    .email
                    .as_ref()
                    .ok_or_else(|| NotifyError::Config("email transport not configured".into()))?;
                email.send(to, "You left something behind", &text).await
            }
        }
    }
}
