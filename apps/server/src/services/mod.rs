//! # Services
//!
//! Business operations behind the HTTP handlers. Each service holds the
//! shared `Arc<dyn RecordStore>` and combines store calls with the pure
//! rules from `hearth-core`.

pub mod auth;
pub mod catalog;
pub mod customer;
pub mod metrics;
pub mod settlement;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use customer::CustomerService;
pub use metrics::MetricsService;
pub use settlement::SettlementService;
