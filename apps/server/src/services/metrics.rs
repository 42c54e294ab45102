//! Metrics service: dashboard figures in the server's local time zone.

use std::sync::Arc;

use chrono::Local;

use hearth_core::metrics::{dashboard_metrics, popular_items, recent_orders};
use hearth_core::metrics::{DashboardMetrics, PopularItem};
use hearth_core::OrderWithItems;
use hearth_db::RecordStore;

use crate::error::ApiResult;

#[derive(Clone)]
pub struct MetricsService {
    store: Arc<dyn RecordStore>,
}

impl MetricsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        MetricsService { store }
    }

    /// Completed sales since local midnight, plus the low-stock count.
    pub async fn dashboard(&self) -> ApiResult<DashboardMetrics> {
        let orders = self.store.list_orders().await?;
        let products = self.store.list_products().await?;
        Ok(dashboard_metrics(&orders, &products, &Local::now()))
    }

    pub async fn popular_items(&self, limit: usize) -> ApiResult<Vec<PopularItem>> {
        let items = self.store.list_order_items().await?;
        let products = self.store.list_products().await?;
        Ok(popular_items(&items, &products, limit))
    }

    pub async fn recent_orders(&self, limit: usize) -> ApiResult<Vec<OrderWithItems>> {
        let orders = self.store.list_orders().await?;
        let items = self.store.list_order_items().await?;
        let payments = self.store.list_payments().await?;
        Ok(recent_orders(orders, items, payments, limit))
    }
}
