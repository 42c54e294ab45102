//! # Settlement Service
//!
//! The order settlement engine: resolves the customer and missing GST
//! rates, plans the settlement in `hearth-core`, and hands the plan to the
//! record store's atomic `commit_settlement`.
//!
//! ## Checkout Flow
//! ```text
//! POST /api/orders {order, items, payments}
//!      │
//!      ├── idempotency key already stored? ──► replay stored order (200)
//!      │
//!      ▼
//! fill missing gstRate from product (default 18%)
//!      │
//!      ▼
//! validate_checkout (empty cart, lines, payments) ──► 400
//!      │
//!      ▼
//! resolve customer (id must exist, else name snapshot / Walk-in)
//!      │
//!      ▼
//! plan_settlement (totals, reconcile)
//!      │
//!      ▼
//! store.commit_settlement (one transaction) ──► SettledOrder (201)
//! ```

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, error, info};

use hearth_core::settlement::{
    plan_settlement, validate_checkout, CheckoutRequest, SettledOrder, SettlementInput,
};
use hearth_core::{Order, OrderWithItems, TaxRate};
use hearth_db::{RecordStore, StoreError};

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct SettlementService {
    store: Arc<dyn RecordStore>,
}

impl SettlementService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        SettlementService { store }
    }

    /// Settles a checkout request.
    ///
    /// ## Errors
    /// - `VALIDATION_ERROR` for an empty cart, bad quantities or amounts
    /// - `NOT_FOUND` when `order.customerId` names no customer
    pub async fn checkout(&self, request: CheckoutRequest) -> ApiResult<SettledOrder> {
        let CheckoutRequest {
            order,
            items,
            payments,
        } = request;

        if let Some(key) = order.idempotency_key {
            if let Some(existing) = self.store.find_order_by_key(key).await? {
                debug!(order_id = existing.order.id, %key, "Checkout already settled");
                return Ok(SettledOrder::replay(existing));
            }
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let fallback = match item.gst_rate {
                Some(rate) => rate,
                None => self
                    .store
                    .get_product(item.product_id)
                    .await?
                    .map(|p| p.gst_rate)
                    .unwrap_or(TaxRate::DEFAULT_GST),
            };
            lines.push(item.into_line(fallback));
        }

        validate_checkout(&lines, &payments)?;

        let snapshot_name = order
            .customer_name
            .filter(|name| !name.trim().is_empty());
        let customer_name = match order.customer_id {
            Some(id) => {
                let customer = self
                    .store
                    .get_customer(id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Customer").with_field("order.customerId"))?;
                snapshot_name.unwrap_or(customer.name)
            }
            None => snapshot_name.unwrap_or_default(),
        };

        let input = SettlementInput {
            lines,
            customer_id: order.customer_id,
            customer_name,
            payments,
            idempotency_key: order.idempotency_key,
        };
        let plan = plan_settlement(input, Utc::now(), || rand::thread_rng().gen_range(0..1000))?;

        let settled = self.store.commit_settlement(&plan).await.map_err(|e| {
            if !e.is_client_error() {
                error!(error = %e, "Settlement commit failed; nothing was written");
            }
            ApiError::from(e)
        })?;

        info!(
            order_id = settled.order.id,
            order_number = %settled.order.order_number,
            total = %settled.order.total,
            status = settled.order.status.as_str(),
            replayed = settled.replayed,
            "Order settled"
        );
        Ok(settled)
    }

    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        Ok(self.store.list_orders().await?)
    }

    pub async fn get_order(&self, id: i64) -> ApiResult<OrderWithItems> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| ApiError::from(StoreError::not_found("Order", id)))
    }
}
