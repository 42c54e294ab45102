//! Order routes. `POST /api/orders` runs the settlement engine.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use hearth_core::settlement::{CheckoutRequest, SettledOrder};
use hearth_core::{Order, OrderWithItems};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/{id}", get(get_by_id))
}

/// GET /api/orders
async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.settlement.list_orders().await?))
}

/// GET /api/orders/{id}
async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<OrderWithItems>> {
    let Path(id) = id?;
    Ok(Json(state.settlement.get_order(id).await?))
}

/// POST /api/orders
///
/// 201 for a new order, 200 when the idempotency key replays a stored one.
async fn create(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SettledOrder>)> {
    let Json(request) = body?;
    let settled = state.settlement.checkout(request).await?;
    let status = if settled.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(settled)))
}
