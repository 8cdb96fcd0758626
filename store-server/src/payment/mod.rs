//! Payment gateways
//!
//! Gateway sessions are opened against an already-created pending order.
//! The handler owns the compensating action: any gateway failure deletes
//! the just-created order so no half-initiated state survives.

mod phonepe;
mod razorpay;

pub use phonepe::PhonePeGateway;
pub use razorpay::RazorpayGateway;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Order, PaymentMethod};
use std::sync::Arc;
use thiserror::Error;

/// Gateway failure. The caller maps every variant to a compensating order
/// delete plus an upstream error response.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway not configured: {0}")]
    Config(String),

    #[error("Gateway request failed: {0}")]
    Http(String),

    #[error("Gateway rejected the request: {0}")]
    Rejected(String),
}

/// A created payment session, shaped per gateway
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "gateway")]
pub enum PaymentSession {
    /// Client-side Razorpay checkout widget parameters
    #[serde(rename = "razorpay")]
    Razorpay {
        gateway_order_id: String,
        amount: i64,
        currency: String,
        key_id: String,
        /// True when credentials are absent and no real gateway call was made
        mock: bool,
    },
    /// PhonePe hosted-checkout redirect
    #[serde(rename = "phonepe")]
    Redirect { redirect_url: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Open a gateway session for a pending order
    async fn create_session(&self, order: &Order) -> Result<PaymentSession, GatewayError>;
}

/// Dispatches to the gateway matching the requested payment method
#[derive(Clone)]
pub struct PaymentService {
    razorpay: Arc<dyn PaymentGateway>,
    phonepe: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(razorpay: Arc<dyn PaymentGateway>, phonepe: Arc<dyn PaymentGateway>) -> Self {
        Self { razorpay, phonepe }
    }

    /// COD has no gateway; callers reject it before reaching here
    pub fn gateway_for(&self, method: PaymentMethod) -> Option<&Arc<dyn PaymentGateway>> {
        match method {
            PaymentMethod::Razorpay => Some(&self.razorpay),
            PaymentMethod::Phonepe => Some(&self.phonepe),
            PaymentMethod::Cod => None,
        }
    }
}

/// Amount in the gateway's smallest unit (paise)
pub(crate) fn to_paise(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
