//! Shared application state.

use std::sync::Arc;

use hearth_db::RecordStore;

use crate::services::{
    AuthService, CatalogService, CustomerService, MetricsService, SettlementService,
};

/// Handed to every handler through `State<AppState>`; cloning is cheap,
/// every service shares the one store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub customers: CustomerService,
    pub settlement: SettlementService,
    pub metrics: MetricsService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        AppState {
            auth: AuthService::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store)),
            customers: CustomerService::new(Arc::clone(&store)),
            settlement: SettlementService::new(Arc::clone(&store)),
            metrics: MetricsService::new(Arc::clone(&store)),
            store,
        }
    }
}
