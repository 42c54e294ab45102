//! # Settlement Planning
//!
//! Turns a finalized cart and the chosen payments into everything the record
//! store has to write, without touching the store.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout → Settled Order                             │
//! │                                                                         │
//! │  SettlementInput { lines, customer, payments, idempotency_key }        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_settlement() ← THIS MODULE (pure)                                │
//! │       ├── 1. validate: lines non-empty, qty > 0, amounts > 0           │
//! │       ├── 2. subtotal, GST (one rounding), total                       │
//! │       ├── 4. payment method: single method or `split`                  │
//! │       ├── 5. item snapshots (price locked at cart-add time)            │
//! │       ├── 7. transaction ids for payments that lack one                │
//! │       └── 8. reconcile: Σ payments ≈ total → completed                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettlementPlan                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RecordStore::commit_settlement() (hearth-db, one transaction)         │
//! │       ├── 3. order id + order number                                   │
//! │       ├── 4/5/7. insert order, items, payments                         │
//! │       └── 6. stock decrements (stale products reported, not fatal)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettledOrder { order, items, payments, unstocked_product_ids }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    Order, OrderItem, OrderStatus, OrderWithItems, Payment, PaymentMethod, PaymentStatus,
    PriceType, Product, TaxRate,
};
use crate::validation::{validate_cart_size, validate_payment_amount, validate_price, validate_quantity};

/// Customer name used when checkout names nobody.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

// =============================================================================
// Inputs
// =============================================================================

/// A cart line at checkout. Every field is a snapshot taken when the line
/// was added; settlement never re-reads the product's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit: String,
    #[ts(type = "string")]
    pub unit_price: Money,
    pub price_type: PriceType,
    #[ts(type = "string")]
    pub gst_rate: TaxRate,
}

impl CartLine {
    /// Snapshots `product` priced at `unit_price`.
    pub fn snapshot(product: &Product, price_type: PriceType, unit_price: Money, quantity: i64) -> Self {
        CartLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit: product.unit.clone(),
            unit_price,
            price_type,
            gst_rate: product.gst_rate,
        }
    }

    /// `quantity × unit_price`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A payment chosen at the tender screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub method: PaymentMethod,
    #[ts(type = "string")]
    pub amount: Money,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl PaymentInput {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        PaymentInput {
            method,
            amount,
            transaction_id: None,
        }
    }
}

// =============================================================================
// Checkout Request (POST /api/orders body)
// =============================================================================

/// Order header as the POS page sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub idempotency_key: Option<Uuid>,
}

/// A cart line as the POS page sends it. `gstRate` may be missing; the
/// engine then takes the product's current rate. `total` is informational
/// and recomputed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[ts(type = "string")]
    pub unit_price: Money,
    #[serde(default)]
    pub price_type: PriceType,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub gst_rate: Option<TaxRate>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub total: Option<Money>,
}

fn default_unit() -> String {
    "piece".to_string()
}

impl CheckoutItem {
    /// Cart line for this item, using `fallback_rate` when no rate was sent.
    pub fn into_line(self, fallback_rate: TaxRate) -> CartLine {
        CartLine {
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
            price_type: self.price_type,
            gst_rate: self.gst_rate.unwrap_or(fallback_rate),
        }
    }
}

impl From<&CartLine> for CheckoutItem {
    fn from(line: &CartLine) -> Self {
        CheckoutItem {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_price: line.unit_price,
            price_type: line.price_type,
            gst_rate: Some(line.gst_rate),
            total: Some(line.line_total()),
        }
    }
}

/// `POST /api/orders` body: `{order, items, payments}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub order: CheckoutOrder,
    pub items: Vec<CheckoutItem>,
    pub payments: Vec<PaymentInput>,
}

/// Everything checkout needs, after the customer has been resolved.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    pub lines: Vec<CartLine>,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub payments: Vec<PaymentInput>,
    pub idempotency_key: Option<Uuid>,
}

// =============================================================================
// Totals & Reconciliation
// =============================================================================

/// Subtotal, GST and grand total of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub gst_amount: Money,
    #[ts(type = "string")]
    pub total: Money,
}

/// Computes order totals.
///
/// ## Example
/// ```text
/// 2 × 50.00 @ 18%  →  subtotal 100.00, GST 18.00, total 118.00
/// ```
pub fn compute_totals(lines: &[CartLine]) -> OrderTotals {
    let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
    let gst_amount = Money::tax_on_lines(lines.iter().map(|l| (l.line_total(), l.gst_rate)));
    OrderTotals {
        subtotal,
        gst_amount,
        total: subtotal + gst_amount,
    }
}

/// Payment total measured against the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    #[ts(type = "string")]
    pub total: Money,
    #[ts(type = "string")]
    pub paid: Money,
    /// `total - paid`; negative when overpaid.
    #[ts(type = "string")]
    pub remaining: Money,
}

impl Reconciliation {
    pub fn new(total: Money, paid: Money) -> Self {
        Reconciliation {
            total,
            paid,
            remaining: total - paid,
        }
    }

    /// `|paid - total| < 0.01`.
    pub fn is_settled(&self) -> bool {
        self.paid.approx_eq(self.total)
    }

    /// Order status and payment status implied by this reconciliation.
    pub fn statuses(&self) -> (OrderStatus, PaymentStatus) {
        if self.is_settled() {
            (OrderStatus::Completed, PaymentStatus::Completed)
        } else {
            (OrderStatus::Processing, PaymentStatus::Pending)
        }
    }
}

/// Reconciles a list of payment amounts against `total`.
pub fn reconcile<I>(total: Money, payments: I) -> Reconciliation
where
    I: IntoIterator<Item = Money>,
{
    Reconciliation::new(total, payments.into_iter().sum())
}

/// Order-level method tag: `split` when several payments were taken.
pub fn order_payment_method(payments: &[PaymentInput]) -> PaymentMethod {
    match payments {
        [single] => single.method,
        _ => PaymentMethod::Split,
    }
}

/// `TXN<unix millis><suffix>`, suffix in 0..=999.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(hearth_core::settlement::transaction_id(at, 42), "TXN170000000012342");
/// ```
pub fn transaction_id(at: DateTime<Utc>, suffix: u16) -> String {
    format!("TXN{}{}", at.timestamp_millis(), suffix % 1000)
}

// =============================================================================
// Plan
// =============================================================================

/// A payment ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPayment {
    pub method: PaymentMethod,
    pub amount: Money,
    pub transaction_id: String,
}

/// Everything the record store writes for one checkout.
#[derive(Debug, Clone)]
pub struct SettlementPlan {
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub reconciliation: Reconciliation,
    pub lines: Vec<CartLine>,
    pub payments: Vec<PlannedPayment>,
    pub idempotency_key: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl SettlementPlan {
    /// The order row, once the store has assigned `id`.
    pub fn order(&self, id: i64) -> Order {
        let (status, payment_status) = self.reconciliation.statuses();
        Order {
            id,
            order_number: crate::types::order_number(id),
            customer_id: self.customer_id,
            customer_name: self.customer_name.clone(),
            subtotal: self.totals.subtotal,
            gst_amount: self.totals.gst_amount,
            total: self.totals.total,
            payment_method: self.payment_method,
            payment_status,
            status,
            idempotency_key: self.idempotency_key,
            created_at: self.created_at,
        }
    }

    /// Order item row for `line`.
    pub fn item(line: &CartLine, id: i64, order_id: i64) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_price: line.unit_price,
            price_type: line.price_type,
            gst_rate: line.gst_rate,
            total: line.line_total(),
        }
    }

    /// Payment row for `payment`.
    pub fn payment(&self, payment: &PlannedPayment, id: i64, order_id: i64) -> Payment {
        Payment {
            id,
            order_id,
            method: payment.method,
            amount: payment.amount,
            transaction_id: Some(payment.transaction_id.clone()),
            status: PaymentStatus::Completed,
            created_at: self.created_at,
        }
    }

    /// Net stock change per line: quantity sold, negated.
    pub fn stock_deltas(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.lines.iter().map(|l| (l.product_id, -l.quantity))
    }
}

/// Structural checks on a checkout, in the order a client should see them:
/// an empty cart first, then each line, then the payments.
///
/// Runs before anything is looked up in the store.
pub fn validate_checkout(lines: &[CartLine], payments: &[PaymentInput]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    validate_cart_size(lines.len())?;

    for (index, line) in lines.iter().enumerate() {
        validate_quantity(line.quantity).map_err(|e| e.at("items", index))?;
        validate_price("unitPrice", line.unit_price).map_err(|e| e.at("items", index))?;
    }

    if payments.is_empty() {
        return Err(ValidationError::Required {
            field: "payments".to_string(),
        }
        .into());
    }

    for (index, payment) in payments.iter().enumerate() {
        validate_payment_amount(payment.amount).map_err(|e| e.at("payments", index))?;
        if payment.method == PaymentMethod::Split {
            return Err(ValidationError::NotAllowed {
                field: "method".to_string(),
                allowed: vec!["cash".to_string(), "card".to_string(), "wallet".to_string()],
            }
            .at("payments", index)
            .into());
        }
    }

    Ok(())
}

/// Validates the input and plans the writes.
///
/// `next_suffix` supplies the random part of generated transaction ids so
/// this function stays deterministic under test.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when there are no lines
/// - [`CoreError::Validation`] naming the offending field, e.g.
///   `items[0].quantity` or `payments[1].amount`
pub fn plan_settlement<F>(
    input: SettlementInput,
    now: DateTime<Utc>,
    mut next_suffix: F,
) -> CoreResult<SettlementPlan>
where
    F: FnMut() -> u16,
{
    validate_checkout(&input.lines, &input.payments)?;

    let totals = compute_totals(&input.lines);
    let payment_method = order_payment_method(&input.payments);
    let reconciliation = reconcile(totals.total, input.payments.iter().map(|p| p.amount));

    let payments = input
        .payments
        .into_iter()
        .map(|p| PlannedPayment {
            method: p.method,
            amount: p.amount,
            transaction_id: p
                .transaction_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| transaction_id(now, next_suffix())),
        })
        .collect();

    let customer_name = if input.customer_name.trim().is_empty() {
        WALK_IN_CUSTOMER.to_string()
    } else {
        input.customer_name
    };

    Ok(SettlementPlan {
        customer_id: input.customer_id,
        customer_name,
        totals,
        payment_method,
        reconciliation,
        lines: input.lines,
        payments,
        idempotency_key: input.idempotency_key,
        created_at: now,
    })
}

// =============================================================================
// Result
// =============================================================================

/// What checkout returns: the `{order, items, payments}` triple plus
/// settlement diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettledOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
    /// Lines whose product no longer existed, so stock was not decremented.
    #[serde(default)]
    pub unstocked_product_ids: Vec<i64>,
    /// True when an earlier request with the same idempotency key already
    /// created this order.
    #[serde(default)]
    pub replayed: bool,
}

impl SettledOrder {
    /// Wraps an already stored order returned for a repeated idempotency key.
    pub fn replay(existing: OrderWithItems) -> Self {
        SettledOrder {
            order: existing.order,
            items: existing.items,
            payments: existing.payments,
            unstocked_product_ids: Vec::new(),
            replayed: true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
