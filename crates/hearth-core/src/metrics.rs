//! # Dashboard Metrics
//!
//! Aggregations behind the dashboard page. Every backend feeds the same
//! functions, so the numbers agree no matter where the records live.
//!
//! ## Counting Rules
//! - Only `completed` orders count toward sales. A partially paid order
//!   stays `processing` and is left out until it settles.
//! - "Today" is `[local midnight, next local midnight)` in the caller's
//!   time zone.
//! - Low stock is a catalog-wide count (`stock <= 10`), independent of
//!   dates.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderItem, OrderStatus, OrderWithItems, Payment, Product};
use crate::LOW_STOCK_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[ts(type = "string")]
    pub today_sales: Money,
    pub orders_today: i64,
    #[ts(type = "string")]
    pub average_order: Money,
    pub low_stock_items: i64,
}

/// Best sellers by units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    /// Product id.
    pub id: i64,
    pub name: String,
    pub category: String,
    pub sold: i64,
    #[ts(type = "string")]
    pub revenue: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// UTC bounds of the local day containing `now`.
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let start = now.date_naive().and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);

    let to_utc = |local: NaiveDateTime| {
        tz.from_local_datetime(&local)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            // midnight skipped by a DST jump; treat the wall time as UTC offset 0
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    };

    (to_utc(start), to_utc(end))
}

/// Today's sales figures plus the low-stock count.
pub fn dashboard_metrics<Tz: TimeZone>(
    orders: &[Order],
    products: &[Product],
    now: &DateTime<Tz>,
) -> DashboardMetrics {
    let (start, end) = day_window(now);

    let today: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .filter(|o| o.created_at >= start && o.created_at < end)
        .collect();

    let today_sales: Money = today.iter().map(|o| o.total).sum();
    let orders_today = today.len() as i64;

    DashboardMetrics {
        today_sales,
        orders_today,
        average_order: today_sales.average_over(orders_today),
        low_stock_items: products
            .iter()
            .filter(|p| p.stock <= LOW_STOCK_THRESHOLD)
            .count() as i64,
    }
}

/// Top `limit` products by quantity sold across all order items.
///
/// Ties keep first-seen order. Items whose product has since been deleted
/// still count under their name snapshot with an empty category.
pub fn popular_items(items: &[OrderItem], products: &[Product], limit: usize) -> Vec<PopularItem> {
    let catalog: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut ranked: Vec<PopularItem> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for item in items {
        let slot = *index.entry(item.product_id).or_insert_with(|| {
            let product = catalog.get(&item.product_id);
            ranked.push(PopularItem {
                id: item.product_id,
                name: product
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| item.product_name.clone()),
                category: product.map(|p| p.category.clone()).unwrap_or_default(),
                sold: 0,
                revenue: Money::zero(),
                image_url: product.and_then(|p| p.image_url.clone()),
            });
            ranked.len() - 1
        });

        let entry = &mut ranked[slot];
        entry.sold += item.quantity;
        entry.revenue += item.total;
    }

    ranked.sort_by(|a, b| b.sold.cmp(&a.sold));
    ranked.truncate(limit);
    ranked
}

/// Newest `limit` orders with their items and payments attached.
pub fn recent_orders(
    mut orders: Vec<Order>,
    items: Vec<OrderItem>,
    payments: Vec<Payment>,
    limit: usize,
) -> Vec<OrderWithItems> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders.truncate(limit);

    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }
    let mut payments_by_order: HashMap<i64, Vec<Payment>> = HashMap::new();
    for payment in payments {
        payments_by_order.entry(payment.order_id).or_default().push(payment);
    }

    orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            payments: payments_by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        order_number, NewProduct, PaymentMethod, PaymentStatus, PriceType, TaxRate,
    };
    use chrono::FixedOffset;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn order(id: i64, total: i64, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            order_number: order_number(id),
            customer_id: None,
            customer_name: "Walk-in Customer".to_string(),
            subtotal: Money::from_minor(total),
            gst_amount: Money::zero(),
            total: Money::from_minor(total),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Completed,
            status,
            idempotency_key: None,
            created_at,
        }
    }

    fn item(id: i64, order_id: i64, product_id: i64, quantity: i64, total: i64) -> OrderItem {
        OrderItem {
            id,
            order_id,
            product_id,
            product_name: format!("Snapshot {}", product_id),
            quantity,
            unit: "piece".to_string(),
            unit_price: Money::from_minor(total / quantity),
            price_type: PriceType::Counter,
            gst_rate: TaxRate::DEFAULT_GST,
            total: Money::from_minor(total),
        }
    }

    fn product(id: i64, stock: i64) -> Product {
        NewProduct {
            name: format!("Product {}", id),
            sku: format!("P{:03}", id),
            category_id: None,
            category: "Cakes".to_string(),
            counter_price: Money::from_minor(100),
            wholesale_price: Money::from_minor(90),
            custom_price: None,
            stock,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
        .into_product(id, Utc::now())
    }

    #[test]
    fn test_day_window_uses_local_midnight() {
        // 01:00 IST on 2 March is still 1 March in UTC
        let now = ist().with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();
        let (start, end) = day_window(&now);

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 2, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_only_completed_orders_count() {
        let now = ist().with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let at = now.with_timezone(&Utc);

        // completed first, processing second
        let orders = vec![
            order(1, 11800, OrderStatus::Completed, at),
            order(2, 5000, OrderStatus::Processing, at),
        ];
        let metrics = dashboard_metrics(&orders, &[], &now);
        assert_eq!(metrics.today_sales.minor(), 11800);
        assert_eq!(metrics.orders_today, 1);
        assert_eq!(metrics.average_order.minor(), 11800);

        // processing first, completed second
        let orders = vec![
            order(1, 5000, OrderStatus::Processing, at),
            order(2, 11800, OrderStatus::Completed, at),
        ];
        let metrics = dashboard_metrics(&orders, &[], &now);
        assert_eq!(metrics.today_sales.minor(), 11800);
        assert_eq!(metrics.orders_today, 1);
    }

    #[test]
    fn test_orders_outside_today_ignored() {
        let now = ist().with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let (start, end) = day_window(&now);

        let orders = vec![
            order(1, 1000, OrderStatus::Completed, start - Duration::seconds(1)),
            order(2, 2000, OrderStatus::Completed, start),
            order(3, 4000, OrderStatus::Completed, end),
        ];
        let metrics = dashboard_metrics(&orders, &[], &now);
        assert_eq!(metrics.today_sales.minor(), 2000);
        assert_eq!(metrics.orders_today, 1);
    }

    #[test]
    fn test_no_orders_gives_zero_average() {
        let now = Utc::now();
        let metrics = dashboard_metrics(&[], &[product(1, 10), product(2, 11)], &now);

        assert_eq!(metrics.orders_today, 0);
        assert_eq!(metrics.average_order, Money::zero());
        assert_eq!(metrics.low_stock_items, 1);
        assert_eq!(
            serde_json::to_value(metrics).unwrap()["averageOrder"],
            serde_json::json!("0.00")
        );
    }

    #[test]
    fn test_popular_items_rank_by_quantity() {
        let products = vec![product(1, 20), product(2, 20), product(3, 20)];
        let items = vec![
            item(1, 1, 1, 2, 200),
            item(2, 1, 2, 5, 500),
            item(3, 2, 1, 1, 100),
            item(4, 2, 3, 3, 300),
        ];

        let popular = popular_items(&items, &products, 10);
        let ids: Vec<i64> = popular.iter().map(|p| p.id).collect();
        // product 1 and 3 tie on 3 units; 1 was seen first
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(popular[1].revenue.minor(), 300);
        assert_eq!(popular[1].category, "Cakes");
    }

    #[test]
    fn test_popular_items_keep_deleted_products() {
        let popular = popular_items(&[item(1, 1, 42, 4, 400)], &[], 10);

        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].name, "Snapshot 42");
        assert_eq!(popular[0].category, "");
    }

    #[test]
    fn test_popular_items_limit_and_empty() {
        assert!(popular_items(&[], &[], 10).is_empty());

        let items: Vec<OrderItem> = (1..=5).map(|i| item(i, 1, i, i, i * 100)).collect();
        assert_eq!(popular_items(&items, &[], 2).len(), 2);
    }

    #[test]
    fn test_recent_orders_newest_first_with_children() {
        let t = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let orders = vec![
            order(1, 100, OrderStatus::Completed, t),
            order(2, 100, OrderStatus::Completed, t),
            order(3, 100, OrderStatus::Completed, t - Duration::hours(1)),
        ];
        let items = vec![item(1, 1, 1, 1, 100), item(2, 2, 1, 1, 100)];

        let recent = recent_orders(orders, items, vec![], 2);
        let ids: Vec<i64> = recent.iter().map(|o| o.order.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(recent[0].items.len(), 1);
        assert_eq!(recent[0].items[0].order_id, 2);
    }
}
