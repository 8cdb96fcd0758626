//! Delhivery carrier client
//!
//! Waybill tracking via the packages JSON endpoint with a static API token.

use async_trait::async_trait;
use serde::Deserialize;

use super::{Carrier, CarrierError, CarrierTracking};
use crate::core::config::DelhiveryConfig;

pub struct DelhiveryCarrier {
    client: reqwest::Client,
    config: DelhiveryConfig,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(rename = "ShipmentData", default)]
    shipment_data: Vec<ShipmentEntry>,
}

#[derive(Debug, Deserialize)]
struct ShipmentEntry {
    #[serde(rename = "Shipment")]
    shipment: Shipment,
}

#[derive(Debug, Deserialize)]
struct Shipment {
    #[serde(rename = "Status")]
    status: ShipmentStatus,
    #[serde(rename = "ExpectedDeliveryDate")]
    expected_delivery_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShipmentStatus {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "StatusDateTime")]
    status_date_time: Option<String>,
}

impl DelhiveryCarrier {
    pub fn new(config: DelhiveryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn parse_millis(value: Option<&str>) -> Option<i64> {
        let value = value?;
        chrono::DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.timestamp_millis())
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|dt| dt.and_utc().timestamp_millis())
                    .ok()
            })
    }
}

#[async_trait]
impl Carrier for DelhiveryCarrier {
    fn name(&self) -> &'static str {
        "delhivery"
    }

    async fn track(&self, awb: &str) -> Result<CarrierTracking, CarrierError> {
        let token = self
            .config
            .api_token
            .as_ref()
            .ok_or_else(|| CarrierError::Config("DELHIVERY_API_TOKEN not set".into()))?;

        let resp = self
            .client
            .get(format!(
                "{}/api/v1/packages/json/?waybill={awb}",
                self.config.base_url
            ))
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .map_err(|e| CarrierError::Http(format!("Delhivery request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CarrierError::Http(format!(
                "Delhivery returned {}",
                resp.status()
            )));
        }

        let data: TrackResponse = resp
            .json()
            .await
            .map_err(|e| CarrierError::Http(format!("Invalid Delhivery response: {e}")))?;

        let shipment = data
            .shipment_data
            .into_iter()
            .next()
            .map(|e| e.shipment)
            .ok_or_else(|| CarrierError::NoData(awb.to_string()))?;

        let raw_status = shipment.status.status;
        let delivered_at = if raw_status.eq_ignore_ascii_case("delivered") {
            Self::parse_millis(shipment.status.status_date_time.as_deref())
        } else {
            None
        };

        Ok(CarrierTracking {
            raw_status,
            estimated_delivery: Self::parse_millis(shipment.expected_delivery_date.as_deref()),
            delivered_at,
            tracking_url: Some(format!("https://www.delhivery.com/track/package/{awb}")),
        })
    }
}
