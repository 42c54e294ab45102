//! Health check route.
//!
//! ```json
//! { "status": "ok", "version": "0.1.0", "storage": { "backend": "sqlite", ... } }
//! ```

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use hearth_db::StoreHealth;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: StoreHealth,
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let storage = state.store.health().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage,
    }))
}
