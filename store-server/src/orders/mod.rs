//! Order lifecycle
//!
//! Creation, payment confirmation, and order-number assignment live here;
//! HTTP handlers stay thin.

mod service;

#[cfg(test)]
mod tests;

pub use service::{CreatedOrder, OrderService};
