//! # Cart
//!
//! The cart the POS page holds while the cashier rings up a sale.
//!
//! The browser keeps its own copy and mirrors it to local storage, so the
//! cart is plain serializable data. Prices are resolved once, when a line is
//! added, and never re-read from the catalog afterwards.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Method                 State Change           │
//! │  ──────────────           ──────                 ────────────           │
//! │                                                                         │
//! │  Tap product ────────────► add_product() ───────► push or merge line   │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► lines[i].qty = n     │
//! │                                                  (0 removes the line)  │
//! │                                                                         │
//! │  Tap remove ─────────────► remove() ────────────► lines.remove(i)      │
//! │                                                                         │
//! │  Clear / after sale ─────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  Checkout ───────────────► checkout_request() ──► CheckoutRequest      │
//! │                                                  (fresh idempotency    │
//! │                                                   key, cart unchanged) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::pricing::resolve_price;
use crate::settlement::{
    compute_totals, CartLine, CheckoutItem, CheckoutOrder, CheckoutRequest, OrderTotals,
    PaymentInput,
};
use crate::types::{Customer, PriceType, Product};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `(product_id, price_type)`; adding the same product
///   at the same tier increases quantity
/// - Quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    fn position(&self, product_id: i64, price_type: PriceType) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.product_id == product_id && l.price_type == price_type)
    }

    /// Adds `quantity` of `product` priced at `price_type`.
    ///
    /// ## Errors
    /// - [`CoreError::QuantityTooLarge`] if the merged quantity passes 999
    /// - [`CoreError::CartTooLarge`] if a new line would be the 101st
    pub fn add_product(
        &mut self,
        product: &Product,
        price_type: PriceType,
        quantity: i64,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(index) = self.position(product.id, price_type) {
            let line = &mut self.lines[index];
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let unit_price = resolve_price(product, price_type);
        self.lines
            .push(CartLine::snapshot(product, price_type, unit_price, quantity));
        Ok(())
    }

    /// Sets a line's quantity; `0` removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: i64,
        price_type: PriceType,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove(product_id, price_type);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        let index = self
            .position(product_id, price_type)
            .ok_or(CoreError::NotInCart { product_id })?;
        self.lines[index].quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64, price_type: PriceType) -> CoreResult<()> {
        let index = self
            .position(product_id, price_type)
            .ok_or(CoreError::NotInCart { product_id })?;
        self.lines.remove(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Same computation the server uses when settling.
    pub fn totals(&self) -> OrderTotals {
        compute_totals(&self.lines)
    }

    /// Builds the `POST /api/orders` body.
    ///
    /// Each call mints a new idempotency key. The client stores the request
    /// it sent and resubmits that exact value after a reconnect, so a retry
    /// cannot settle the cart twice.
    pub fn checkout_request(
        &self,
        customer: Option<&Customer>,
        payments: Vec<PaymentInput>,
    ) -> CoreResult<CheckoutRequest> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(CheckoutRequest {
            order: CheckoutOrder {
                customer_id: customer.map(|c| c.id),
                customer_name: customer.map(|c| c.name.clone()),
                idempotency_key: Some(Uuid::new_v4()),
            },
            items: self.lines.iter().map(CheckoutItem::from).collect(),
            payments,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{NewProduct, PaymentMethod, TaxRate};
    use chrono::Utc;

    fn product(id: i64, counter: i64, wholesale: i64) -> Product {
        NewProduct {
            name: format!("Product {}", id),
            sku: format!("SKU{:03}", id),
            category_id: None,
            category: "Cakes".to_string(),
            counter_price: Money::from_minor(counter),
            wholesale_price: Money::from_minor(wholesale),
            custom_price: None,
            stock: 20,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
        .into_product(id, Utc::now())
    }

    #[test]
    fn test_add_product_snapshots_price() {
        let mut cart = Cart::new();
        let cake = product(1, 12000, 10000);

        cart.add_product(&cake, PriceType::Wholesale, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].unit_price.minor(), 10000);
        assert_eq!(cart.lines[0].gst_rate, TaxRate::DEFAULT_GST);
    }

    #[test]
    fn test_same_product_same_tier_merges() {
        let mut cart = Cart::new();
        let cake = product(1, 12000, 10000);

        cart.add_product(&cake, PriceType::Counter, 2).unwrap();
        cart.add_product(&cake, PriceType::Counter, 3).unwrap();
        cart.add_product(&cake, PriceType::Wholesale, 1).unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_quantity(), 6);
    }

    #[test]
    fn test_price_locked_after_catalog_change() {
        let mut cart = Cart::new();
        let mut cake = product(1, 12000, 10000);
        cart.add_product(&cake, PriceType::Counter, 1).unwrap();

        cake.counter_price = Money::from_minor(15000);
        cart.add_product(&cake, PriceType::Counter, 1).unwrap();

        assert_eq!(cart.lines[0].unit_price.minor(), 12000);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_merge_beyond_limit_rejected() {
        let mut cart = Cart::new();
        let cake = product(1, 100, 100);
        cart.add_product(&cake, PriceType::Counter, 990).unwrap();

        let err = cart.add_product(&cake, PriceType::Counter, 10).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.lines[0].quantity, 990);
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for id in 1..=MAX_CART_ITEMS as i64 {
            cart.add_product(&product(id, 100, 100), PriceType::Counter, 1)
                .unwrap();
        }

        let err = cart
            .add_product(&product(1000, 100, 100), PriceType::Counter, 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: 100 }));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 100, 100), PriceType::Counter, 3)
            .unwrap();

        cart.update_quantity(1, PriceType::Counter, 0).unwrap();
        assert!(cart.is_empty());

        let err = cart.update_quantity(1, PriceType::Counter, 2).unwrap_err();
        assert!(matches!(err, CoreError::NotInCart { product_id: 1 }));
    }

    #[test]
    fn test_totals_match_settlement() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 5000, 4000), PriceType::Counter, 2)
            .unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.minor(), 10000);
        assert_eq!(totals.gst_amount.minor(), 1800);
        assert_eq!(totals.total.minor(), 11800);
    }

    #[test]
    fn test_checkout_request_has_fresh_key() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 5000, 4000), PriceType::Counter, 2)
            .unwrap();
        let payments = vec![PaymentInput::new(PaymentMethod::Cash, Money::from_minor(11800))];

        let first = cart.checkout_request(None, payments.clone()).unwrap();
        let second = cart.checkout_request(None, payments).unwrap();

        assert!(first.order.idempotency_key.is_some());
        assert_ne!(first.order.idempotency_key, second.order.idempotency_key);
        assert_eq!(first.items[0].gst_rate, Some(TaxRate::DEFAULT_GST));
        assert_eq!(first.items[0].total.map(|m| m.minor()), Some(10000));
    }

    #[test]
    fn test_empty_cart_cannot_check_out() {
        let err = Cart::new().checkout_request(None, vec![]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_cart_survives_json_round_trip() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, 5000, 4000), PriceType::Custom, 1)
            .unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
