//! WhatsApp Cloud API client
//!
//! Text sends through the Graph API messages endpoint.

use serde_json::json;

use super::NotifyError;
use crate::core::config::WhatsAppConfig;

const GRAPH_API: &str = "https://graph.facebook.com/v19.0";

#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    token: String,
    phone_number_id: String,
}

impl WhatsAppClient {
    /// None when the Cloud API is not configured
    pub fn from_config(config: &WhatsAppConfig) -> Option<Self> {
        Some(Self {
            client: reqwest::Client::new(),
            token: config.token.clone()?,
            phone_number_id: config.phone_number_id.clone()?,
        })
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body },
        });

        let resp = self
            .client
            .post(format!("{GRAPH_API}/{}/messages", self.phone_number_id))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Send(format!("WhatsApp request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Send(format!(
                "WhatsApp send failed: {status} - {text}"
            )));
        }
        Ok(())
    }
}
