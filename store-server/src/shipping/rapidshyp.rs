//! RapidShyp carrier client
//!
//! Tracking behind a login-token flow: authenticate with account
//! credentials, cache the short-lived token, retry login once on expiry.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{Carrier, CarrierError, CarrierTracking, TokenCache};
use crate::core::config::RapidShypConfig;

/// Tokens last an hour server-side; refresh a little early
const TOKEN_TTL_MS: i64 = 50 * 60 * 1000;
const TOKEN_KEY: &str = "rapidshyp";

pub struct RapidShypCarrier {
    client: reqwest::Client,
    config: RapidShypConfig,
    tokens: Arc<TokenCache>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct TrackResponse {
    #[serde(default)]
    records: Vec<TrackRecord>,
}

#[derive(Debug, Deserialize)]
struct TrackRecord {
    current_status: String,
    #[serde(default)]
    etd: Option<i64>,
    #[serde(default)]
    delivered_date: Option<i64>,
    #[serde(default)]
    tracking_url: Option<String>,
}

impl RapidShypCarrier {
    pub fn new(config: RapidShypConfig, tokens: Arc<TokenCache>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    async fn login(&self) -> Result<String, CarrierError> {
        let (Some(email), Some(password)) = (&self.config.email, &self.config.password) else {
            return Err(CarrierError::Config(
                "RAPIDSHYP_EMAIL / RAPIDSHYP_PASSWORD not set".into(),
            ));
        };

        let resp = self
            .client
            .post(format!("{}/auth/login", self.config.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| CarrierError::Http(format!("RapidShyp login failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CarrierError::Http(format!(
                "RapidShyp login returned {}",
                resp.status()
            )));
        }

        let data: LoginResponse = resp
            .json()
            .await
            .map_err(|e| CarrierError::Http(format!("Invalid RapidShyp login response: {e}")))?;

        self.tokens.put(TOKEN_KEY, data.token.clone(), TOKEN_TTL_MS);
        Ok(data.token)
    }

    async fn token(&self) -> Result<String, CarrierError> {
        match self.tokens.get(TOKEN_KEY) {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    async fn fetch_track(&self, token: &str, awb: &str) -> Result<reqwest::Response, CarrierError> {
        self.client
            .post(format!("{}/shipment/track", self.config.base_url))
            .header("rs-token", token)
            .json(&json!({ "awb": awb }))
            .send()
            .await
            .map_err(|e| CarrierError::Http(format!("RapidShyp request failed: {e}")))
    }
}

#[async_trait]
impl Carrier for RapidShypCarrier {
    fn name(&self) -> &'static str {
        "rapidshyp"
    }

    async fn track(&self, awb: &str) -> Result<CarrierTracking, CarrierError> {
        let token = self.token().await?;
        let mut resp = self.fetch_track(&token, awb).await?;

        // Expired token: invalidate, login again, retry once
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.invalidate(TOKEN_KEY);
            let token = self.login().await?;
            resp = self.fetch_track(&token, awb).await?;
        }

        if !resp.status().is_success() {
            return Err(CarrierError::Http(format!(
                "RapidShyp returned {}",
                resp.status()
            )));
        }

        let data: TrackResponse = resp
            .json()
            .await
            .map_err(|e| CarrierError::Http(format!("Invalid RapidShyp response: {e}")))?;

        let record = data
            .records
            .into_iter()
            .next()
            .ok_or_else(|| CarrierError::NoData(awb.to_string()))?;

        Ok(CarrierTracking {
            raw_status: record.current_status,
            estimated_delivery: record.etd,
            delivered_at: record.delivered_date,
            tracking_url: record.tracking_url,
        })
    }
}
