//! Razorpay gateway
//!
//! Creates a Razorpay order object for client-side checkout widget use.
//! Without credentials the gateway returns a mock session for local
//! testing; the local order persists either way.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use shared::models::{Order, PaymentMethod};

use super::{GatewayError, PaymentGateway, PaymentSession, to_paise};
use crate::core::config::RazorpayConfig;

const RAZORPAY_API: &str = "https://api.razorpay.com/v1";

pub struct RazorpayGateway {
    client: reqwest::Client,
    config: RazorpayConfig,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn mock_session(&self, order: &Order) -> PaymentSession {
        tracing::warn!(
            order_id = order.id,
            "Razorpay credentials absent, returning mock session"
        );
        PaymentSession::Razorpay {
            gateway_order_id: format!("order_mock_{}", order.id),
            amount: to_paise(order.total),
            currency: "INR".into(),
            key_id: "rzp_test_mock".into(),
            mock: true,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Razorpay
    }

    async fn create_session(&self, order: &Order) -> Result<PaymentSession, GatewayError> {
        let (Some(key_id), Some(key_secret)) =
            (self.config.key_id.clone(), self.config.key_secret.clone())
        else {
            return Ok(self.mock_session(order));
        };

        let body = json!({
            "amount": to_paise(order.total),
            "currency": "INR",
            "receipt": order.id.to_string(),
        });

        let resp = self
            .client
            .post(format!("{RAZORPAY_API}/orders"))
            .basic_auth(&key_id, Some(&key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Http(format!("Razorpay connection failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!(
                "Razorpay order create failed: {status} - {text}"
            )));
        }

        let data: RazorpayOrderResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(format!("Invalid Razorpay response: {e}")))?;

        Ok(PaymentSession::Razorpay {
            gateway_order_id: data.id,
            amount: data.amount,
            currency: data.currency,
            key_id,
            mock: false,
        })
    }
}
