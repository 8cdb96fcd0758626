//! Shipping carriers and tracking sync
//!
//! Single and batch tracking reconciliation: pull carrier status for
//! shipped orders, normalize the carrier's free-text status through a
//! static lookup table, and write the result back. Carrier API failures
//! degrade to the previously cached fields instead of failing the request.

mod delhivery;
mod rapidshyp;
pub mod status_map;
mod token_cache;

pub use delhivery::DelhiveryCarrier;
pub use rapidshyp::RapidShypCarrier;
pub use token_cache::TokenCache;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Order, OrderStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::db::repository::order::{self, TrackingPatch};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("Carrier not configured: {0}")]
    Config(String),

    #[error("Carrier request failed: {0}")]
    Http(String),

    #[error("Carrier returned no data for {0}")]
    NoData(String),
}

/// Raw tracking data as returned by a carrier
#[derive(Debug, Clone)]
pub struct CarrierTracking {
    pub raw_status: String,
    pub estimated_delivery: Option<i64>,
    pub delivered_at: Option<i64>,
    pub tracking_url: Option<String>,
}

#[async_trait]
pub trait Carrier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn track(&self, awb: &str) -> Result<CarrierTracking, CarrierError>;
}

/// Normalized tracking fields returned to the admin screens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order_id: i64,
    pub awb_number: String,
    pub status: OrderStatus,
    pub shipping_status: Option<String>,
    pub tracking_url: Option<String>,
    pub estimated_delivery: Option<i64>,
    pub delivered_at: Option<i64>,
    pub last_tracking_sync: Option<i64>,
    /// True when the carrier call failed and these are previously synced fields
    pub cached: bool,
}

impl TrackingView {
    fn cached_from(order: &Order, awb: String) -> Self {
        Self {
            order_id: order.id,
            awb_number: awb,
            status: order.status,
            shipping_status: order.shipping_status.clone(),
            tracking_url: order.tracking_url.clone(),
            estimated_delivery: order.estimated_delivery,
            delivered_at: order.delivered_at,
            last_tracking_sync: order.last_tracking_sync,
            cached: true,
        }
    }
}

/// Per-order outcome of the batch sync; individual failures never abort
/// the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncResult {
    pub order_id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Holds the configured carriers and dispatches by an order's provider tag
#[derive(Clone)]
pub struct ShippingService {
    carriers: HashMap<String, Arc<dyn Carrier>>,
    default_provider: String,
}

impl ShippingService {
    pub fn new(carriers: Vec<Arc<dyn Carrier>>, default_provider: &str) -> Self {
        let carriers = carriers
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect();
        Self {
            carriers,
            default_provider: default_provider.to_string(),
        }
    }

    fn carrier_for(&self, provider: Option<&str>) -> Option<&Arc<dyn Carrier>> {
        let name = provider.unwrap_or(&self.default_provider).to_lowercase();
        self.carriers.get(&name)
    }

    /// Sync one order against its carrier. Returns cached fields with
    /// `cached: true` when the carrier call fails.
    pub async fn sync_order(&self, pool: &SqlitePool, order: &Order) -> AppResult<TrackingView> {
        let awb = order
            .awb_number
            .clone()
            .ok_or_else(|| AppError::validation(format!("Order {} has no AWB", order.id)))?;

        let carrier = self
            .carrier_for(order.shipping_provider.as_deref())
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unknown shipping provider {:?}",
                    order.shipping_provider
                ))
            })?;

        let tracking = match carrier.track(&awb).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(
                    order_id = order.id,
                    awb = %awb,
                    carrier = carrier.name(),
                    error = %e,
                    "Carrier tracking failed, serving cached fields"
                );
                return Ok(TrackingView::cached_from(order, awb));
            }
        };

        let status = status_map::map_carrier_status(carrier.name(), &tracking.raw_status);
        let now = now_millis();
        let delivered_at = match status {
            OrderStatus::Delivered | OrderStatus::RtoDelivered => {
                tracking.delivered_at.or(Some(now))
            }
            _ => tracking.delivered_at,
        };

        let patch = TrackingPatch {
            status,
            shipping_status: status_map::normalized_label(status).to_string(),
            tracking_url: tracking.tracking_url,
            estimated_delivery: tracking.estimated_delivery,
            delivered_at,
            last_tracking_sync: now,
        };
        order::apply_tracking(pool, order.id, &patch).await?;

        Ok(TrackingView {
            order_id: order.id,
            awb_number: awb,
            status,
            shipping_status: Some(patch.shipping_status),
            tracking_url: patch.tracking_url,
            estimated_delivery: patch.estimated_delivery,
            delivered_at: patch.delivered_at,
            last_tracking_sync: Some(now),
            cached: false,
        })
    }

    /// Sync every non-terminal shipped order, collecting per-order outcomes
    pub async fn sync_all(&self, pool: &SqlitePool) -> AppResult<Vec<BatchSyncResult>> {
        let orders = order::find_trackable(pool).await?;
        let mut results = Vec::with_capacity(orders.len());

        for order in &orders {
            match self.sync_order(pool, order).await {
                Ok(view) => results.push(BatchSyncResult {
                    order_id: order.id,
                    success: true,
                    error: None,
                    status: Some(view.status),
                }),
                Err(e) => results.push(BatchSyncResult {
                    order_id: order.id,
                    success: false,
                    error: Some(e.to_string()),
                    status: None,
                }),
            }
        }

        Ok(results)
    }
}
