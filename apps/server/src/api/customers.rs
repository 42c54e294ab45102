//! Customer routes.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use hearth_core::{Customer, CustomerPatch, NewCustomer};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/{id}", get(get_by_id).put(update).delete(delete))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// GET /api/customers?search=
async fn list(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Customer>>> {
    let Query(query) = query?;
    Ok(Json(state.customers.list(query.search.as_deref()).await?))
}

/// GET /api/customers/{id}
async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Customer>> {
    let Path(id) = id?;
    Ok(Json(state.customers.get(id).await?))
}

/// POST /api/customers
async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let Json(customer) = body?;
    let customer = state.customers.create(customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /api/customers/{id}
async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> ApiResult<Json<Customer>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.customers.update(id, patch).await?))
}

/// DELETE /api/customers/{id}
async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.customers.delete(id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}
