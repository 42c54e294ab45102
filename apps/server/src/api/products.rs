//! Product routes.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use hearth_core::filter::ProductFilter;
use hearth_core::{NewProduct, Product, ProductPatch};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list).post(create))
        .route("/products/{id}", get(get_by_id).put(update).delete(delete))
}

/// GET /api/products?category=&search=
async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProductFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(filter) = query?;
    Ok(Json(state.catalog.list_products(filter).await?))
}

/// GET /api/products/{id}
async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_product(id).await?))
}

/// POST /api/products
async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(product) = body?;
    let product = state.catalog.create_product(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    let Json(patch) = body?;
    Ok(Json(state.catalog.update_product(id, patch).await?))
}

/// DELETE /api/products/{id}
async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.catalog.delete_product(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
