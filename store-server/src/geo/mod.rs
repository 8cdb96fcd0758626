//! Best-effort IP geolocation
//!
//! Enriches abandoned-checkout rows with city/country. Lookup failure is
//! swallowed (fields stay blank); it must never block the cart sync.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GeoInfo {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Clone)]
pub struct GeoLookup {
    client: reqwest::Client,
    base_url: String,
}

impl GeoLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve an IP to city/country, or None on any failure
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        if ip.is_empty() || ip == "127.0.0.1" || ip == "::1" {
            return None;
        }

        let resp = self
            .client
            .get(format!("{}/{ip}", self.base_url))
            .send()
            .await
            .map_err(|e| tracing::debug!(ip, error = %e, "Geolocation request failed"))
            .ok()?;

        let data: GeoApiResponse = resp
            .json()
            .await
            .map_err(|e| tracing::debug!(ip, error = %e, "Geolocation parse failed"))
            .ok()?;

        if data.status.as_deref() == Some("fail") {
            return None;
        }

        Some(GeoInfo {
            city: data.city,
            country: data.country,
        })
    }
}
