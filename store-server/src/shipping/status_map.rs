//! Carrier status normalization
//!
//! Static lookup tables from carrier free-text statuses to the internal
//! order status enum. Matching is case-insensitive on the trimmed string;
//! anything unrecognized falls back to PROCESSING rather than erroring.

use shared::models::OrderStatus;

/// Delhivery scan statuses
const DELHIVERY: &[(&str, OrderStatus)] = &[
    ("MANIFESTED", OrderStatus::Processing),
    ("NOT PICKED", OrderStatus::Processing),
    ("PICKED UP", OrderStatus::Shipped),
    ("IN TRANSIT", OrderStatus::Shipped),
    ("PENDING", OrderStatus::Shipped),
    ("DISPATCHED", OrderStatus::OutForDelivery),
    ("OUT FOR DELIVERY", OrderStatus::OutForDelivery),
    ("DELIVERED", OrderStatus::Delivered),
    ("RTO", OrderStatus::Rto),
    ("RTO IN TRANSIT", OrderStatus::Rto),
    ("RTO DELIVERED", OrderStatus::RtoDelivered),
    ("RETURNED", OrderStatus::RtoDelivered),
    ("CANCELLED", OrderStatus::Cancelled),
    ("LOST", OrderStatus::Cancelled),
];

/// RapidShyp shipment statuses
const RAPIDSHYP: &[(&str, OrderStatus)] = &[
    ("ORDER_PLACED", OrderStatus::Processing),
    ("PICKUP_SCHEDULED", OrderStatus::Processing),
    ("PICKUP_GENERATED", OrderStatus::Processing),
    ("PICKED_UP", OrderStatus::Shipped),
    ("IN_TRANSIT", OrderStatus::Shipped),
    ("IN TRANSIT", OrderStatus::Shipped),
    ("REACHED_DESTINATION", OrderStatus::Shipped),
    ("OUT_FOR_DELIVERY", OrderStatus::OutForDelivery),
    ("OUT FOR DELIVERY", OrderStatus::OutForDelivery),
    ("DELIVERED", OrderStatus::Delivered),
    ("UNDELIVERED", OrderStatus::Shipped),
    ("RTO_INITIATED", OrderStatus::Rto),
    ("RTO_IN_TRANSIT", OrderStatus::Rto),
    ("RTO_DELIVERED", OrderStatus::RtoDelivered),
    ("CANCELLED", OrderStatus::Cancelled),
];

/// Map a carrier's free-text status to the internal enum.
/// Unknown carriers or statuses resolve to PROCESSING.
pub fn map_carrier_status(carrier: &str, raw: &str) -> OrderStatus {
    let table = match carrier.to_lowercase().as_str() {
        "delhivery" => DELHIVERY,
        "rapidshyp" => RAPIDSHYP,
        _ => return OrderStatus::Processing,
    };

    let needle = raw.trim().to_uppercase();
    table
        .iter()
        .find(|(key, _)| *key == needle)
        .map(|(_, status)| *status)
        .unwrap_or(OrderStatus::Processing)
}

/// Normalized label stored in `shipping_status`
pub fn normalized_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "PENDING",
        OrderStatus::Processing => "PROCESSING",
        OrderStatus::Completed => "COMPLETED",
        OrderStatus::Cancelled => "CANCELLED",
        OrderStatus::Shipped => "SHIPPED",
        OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
        OrderStatus::Delivered => "DELIVERED",
        OrderStatus::Rto => "RTO",
        OrderStatus::RtoDelivered => "RTO_DELIVERED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_delhivery_status_maps() {
        for (raw, expected) in DELHIVERY {
            assert_eq!(map_carrier_status("delhivery", raw), *expected);
        }
    }

    #[test]
    fn every_known_rapidshyp_status_maps() {
        for (raw, expected) in RAPIDSHYP {
            assert_eq!(map_carrier_status("rapidshyp", raw), *expected);
        }
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        assert_eq!(
            map_carrier_status("delhivery", "  delivered "),
            OrderStatus::Delivered
        );
        assert_eq!(
            map_carrier_status("Delhivery", "Out For Delivery"),
            OrderStatus::OutForDelivery
        );
    }

    #[test]
    fn unknown_status_falls_back_to_processing() {
        assert_eq!(
            map_carrier_status("delhivery", "UNKNOWN_STATUS"),
            OrderStatus::Processing
        );
        assert_eq!(
            map_carrier_status("rapidshyp", ""),
            OrderStatus::Processing
        );
    }

    #[test]
    fn unknown_carrier_falls_back_to_processing() {
        assert_eq!(
            map_carrier_status("bluedart", "DELIVERED"),
            OrderStatus::Processing
        );
    }
}
