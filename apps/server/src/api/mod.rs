//! # HTTP API
//!
//! One module per resource, each exposing `router()`. Everything is
//! mounted under `/api`.
//!
//! | Path | Methods |
//! |------|---------|
//! | /api/auth/login, /logout, /me | POST, POST, GET |
//! | /api/users | GET, POST |
//! | /api/products, /{id} | GET, POST / GET, PUT, DELETE |
//! | /api/categories | GET, POST |
//! | /api/customers, /{id} | GET, POST / GET, PUT, DELETE |
//! | /api/orders, /{id} | GET, POST / GET |
//! | /api/dashboard/metrics, /popular-items, /recent-orders | GET |
//! | /api/health | GET |

use axum::Router;
use serde::{Deserialize, Serialize};

use hearth_core::DEFAULT_LIST_LIMIT;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(customers::router())
        .merge(orders::router())
        .merge(dashboard::router())
        .merge(health::router());

    Router::new().nest("/api", api)
}

/// `{message}` body of logout and DELETE responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// `?limit=` query. Missing, unparsable or zero falls back to 10.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LIST_LIMIT)
    }
}
