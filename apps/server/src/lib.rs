//! # Hearth POS Server
//!
//! REST API for the bakery point of sale.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth Server                                    │
//! │                                                                         │
//! │  Browser ───► axum (/api, 5000) ───► Services ───► RecordStore          │
//! │                                         │          (memory/csv/sqlite)  │
//! │                                         ▼                               │
//! │                                    hearth-core                          │
//! │                           (pricing, settlement, metrics)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig, StorageKind};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the full router with tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
