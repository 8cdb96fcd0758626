//! Order lifecycle service

use shared::models::{Order, OrderCreate, OrderStatus, PaymentStatus};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

use crate::db::repository::order::{self, NewOrder, NewOrderItem};
use crate::db::repository::{checkout, promo_code, sequence};
use crate::notify::{Notifier, NotifyTask};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_CODE_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Result of creating an order. `order_number` stays None for online
/// payments until the gateway confirmation lands.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub order_number: Option<i64>,
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    notifier: Notifier,
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Materialize a cart into a persisted order with immutable line-item
    /// price snapshots. COD orders are confirmed on the spot: order number,
    /// promo counter, notification. Online orders stay PENDING/PENDING
    /// until [`Self::confirm_payment`].
    pub async fn create_order(&self, data: OrderCreate) -> AppResult<CreatedOrder> {
        if data.cart.is_empty() {
            return Err(AppError::validation("Cart is empty"));
        }
        if data.total <= 0.0 {
            return Err(AppError::validation("Total is required"));
        }
        validate_required_text(&data.shipping_info.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.shipping_info.address, "address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&data.shipping_info.email, "email", MAX_EMAIL_LEN)?;
        validate_optional_text(&data.shipping_info.phone, "phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.promo_code, "promoCode", MAX_CODE_LEN)?;
        for line in &data.cart {
            if line.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Invalid quantity for product {}",
                    line.id
                )));
            }
        }

        let is_cod = data.payment_method.is_cod();
        let order_id = snowflake_id();
        let address = serde_json::to_string(&data.shipping_info)
            .map_err(|e| AppError::validation(format!("Invalid shipping info: {e}")))?;

        let new_order = NewOrder {
            id: order_id,
            user_id: data.user_id,
            customer_name: data.shipping_info.name.clone(),
            customer_email: data.shipping_info.email.clone(),
            customer_phone: data.shipping_info.phone.clone(),
            total: data.total,
            shipping_fee: data.shipping_fee,
            discount_amount: data.discount_amount,
            promo_code: data.promo_code.clone(),
            // COD orders are real immediately; online orders wait for the
            // gateway callback before leaving PENDING
            status: if is_cod {
                OrderStatus::Processing
            } else {
                OrderStatus::Pending
            },
            payment_status: PaymentStatus::Pending,
            payment_method: data.payment_method,
            address,
        };

        let items: Vec<NewOrderItem> = data
            .cart
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.id,
                quantity: line.quantity,
                price: line.price * line.quantity as f64,
            })
            .collect();

        order::create_with_items(&self.pool, new_order, &items).await?;

        let mut order_number = None;
        if is_cod {
            order_number = Some(self.finalize_confirmed(order_id).await?);
        }

        Ok(CreatedOrder {
            order_id,
            order_number,
        })
    }

    /// Gateway-callback-driven payment confirmation. Idempotent: a second
    /// callback for the same order changes nothing and consumes no
    /// sequence number.
    pub async fn confirm_payment(&self, order_id: i64) -> AppResult<Order> {
        let existing = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        if existing.payment_status == PaymentStatus::Successful {
            return Ok(existing);
        }
        if existing.payment_method.is_cod() {
            return Err(AppError::validation(
                "COD orders are confirmed at creation",
            ));
        }

        // Only the call that actually flips PENDING -> SUCCESSFUL runs the
        // confirmation side effects; a racing callback that lost skips them
        let transitioned = order::mark_payment_successful(&self.pool, order_id).await?;
        if transitioned {
            self.finalize_confirmed(order_id).await?;
        }

        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))
    }

    /// Shared tail of COD creation and online confirmation: assign the
    /// order number, bump the promo counter, close out recovered carts,
    /// and fire the confirmation notification (best-effort).
    async fn finalize_confirmed(&self, order_id: i64) -> AppResult<i64> {
        let number = sequence::assign_order_number(&self.pool, order_id).await?;

        let order = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        if let Some(code) = &order.promo_code {
            promo_code::increment_usage(&self.pool, code).await?;
        }

        // Recovery heuristic: a confirmed order from a customer who got a
        // recovery message closes their outstanding snapshots
        let recovered = checkout::mark_recovered_for_customer(
            &self.pool,
            order.user_id,
            order.customer_phone.as_deref(),
            order.customer_email.as_deref(),
        )
        .await?;
        if recovered > 0 {
            tracing::info!(order_id, recovered, "Marked abandoned checkouts recovered");
        }

        self.notifier
            .dispatch(NotifyTask::OrderConfirmation { order });

        Ok(number)
    }
}
