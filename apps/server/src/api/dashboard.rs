//! Dashboard routes.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use hearth_core::metrics::{DashboardMetrics, PopularItem};
use hearth_core::OrderWithItems;

use super::LimitQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/metrics", get(metrics))
        .route("/dashboard/popular-items", get(popular_items))
        .route("/dashboard/recent-orders", get(recent_orders))
}

/// GET /api/dashboard/metrics
async fn metrics(State(state): State<AppState>) -> ApiResult<Json<DashboardMetrics>> {
    Ok(Json(state.metrics.dashboard().await?))
}

/// GET /api/dashboard/popular-items?limit=
async fn popular_items(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<PopularItem>>> {
    Ok(Json(state.metrics.popular_items(query.limit()).await?))
}

/// GET /api/dashboard/recent-orders?limit=
async fn recent_orders(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.metrics.recent_orders(query.limit()).await?))
}
