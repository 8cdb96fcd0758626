//! PhonePe gateway
//!
//! Pay-page flow: base64 JSON payload, SHA-256 X-VERIFY checksum salted
//! with the configured key, POST to the pay endpoint, return the hosted
//! checkout redirect URL.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use shared::models::{Order, PaymentMethod};

use super::{GatewayError, PaymentGateway, PaymentSession, to_paise};
use crate::core::config::PhonePeConfig;

const PAY_PATH: &str = "/pg/v1/pay";

pub struct PhonePeGateway {
    client: reqwest::Client,
    config: PhonePeConfig,
}

#[derive(Debug, Deserialize)]
struct PayResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<PayData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayData {
    instrument_response: Option<InstrumentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Deserialize)]
struct RedirectInfo {
    url: String,
}

impl PhonePeGateway {
    pub fn new(config: PhonePeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// X-VERIFY: sha256(base64_payload + path + salt_key) hex, "###", salt index
    fn checksum(payload_b64: &str, salt_key: &str, salt_index: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload_b64.as_bytes());
        hasher.update(PAY_PATH.as_bytes());
        hasher.update(salt_key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{digest}###{salt_index}")
    }
}

#[async_trait]
impl PaymentGateway for PhonePeGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Phonepe
    }

    async fn create_session(&self, order: &Order) -> Result<PaymentSession, GatewayError> {
        let merchant_id = self
            .config
            .merchant_id
            .clone()
            .ok_or_else(|| GatewayError::Config("PHONEPE_MERCHANT_ID not set".into()))?;
        let salt_key = self
            .config
            .salt_key
            .clone()
            .ok_or_else(|| GatewayError::Config("PHONEPE_SALT_KEY not set".into()))?;

        let payload = json!({
            "merchantId": merchant_id,
            "merchantTransactionId": order.id.to_string(),
            "merchantUserId": order
                .user_id
                .map(|u| u.to_string())
                .unwrap_or_else(|| format!("guest_{}", order.id)),
            "amount": to_paise(order.total),
            "redirectUrl": self.config.redirect_url,
            "redirectMode": "REDIRECT",
            "callbackUrl": self.config.redirect_url,
            "paymentInstrument": { "type": "PAY_PAGE" },
        });
        let payload_b64 = BASE64.encode(payload.to_string());
        let x_verify = Self::checksum(&payload_b64, &salt_key, &self.config.salt_index);

        let resp = self
            .client
            .post(format!("{}{PAY_PATH}", self.config.base_url))
            .header("X-VERIFY", x_verify)
            .json(&json!({ "request": payload_b64 }))
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("PhonePe connection failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!(
                "PhonePe pay failed: {status} - {text}"
            )));
        }

        let data: PayResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(format!("Invalid PhonePe response: {e}")))?;

        if !data.success {
            let msg = data.message.unwrap_or_else(|| "Unknown error".into());
            return Err(GatewayError::Rejected(format!("PhonePe pay failed: {msg}")));
        }

        let redirect_url = data
            .data
            .and_then(|d| d.instrument_response)
            .and_then(|i| i.redirect_info)
            .map(|r| r.url)
            .ok_or_else(|| {
                GatewayError::Rejected("PhonePe response missing redirect URL".into())
            })?;

        Ok(PaymentSession::Redirect { redirect_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_stable_and_carries_salt_index() {
        let a = PhonePeGateway::checksum("eyJ0ZXN0IjoxfQ==", "salt-key", "1");
        let b = PhonePeGateway::checksum("eyJ0ZXN0IjoxfQ==", "salt-key", "1");
        assert_eq!(a, b);
        assert!(a.ends_with("###1"));
        // 64 hex chars + "###" + index
        assert_eq!(a.len(), 64 + 4);
    }

    #[test]
    fn checksum_changes_with_salt() {
        let a = PhonePeGateway::checksum("payload", "salt-a", "1");
        let b = PhonePeGateway::checksum("payload", "salt-b", "1");
        assert_ne!(a[..64], b[..64]);
    }
}
