//! Customer service: CRUD and search.

use std::sync::Arc;

use hearth_core::filter::customer_matches;
use hearth_core::validation::{
    validate_customer_patch, validate_new_customer, validate_search_query,
};
use hearth_core::{Customer, CustomerPatch, NewCustomer};
use hearth_db::RecordStore;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn RecordStore>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CustomerService { store }
    }

    /// All customers, or those whose name, phone or email contains `search`.
    pub async fn list(&self, search: Option<&str>) -> ApiResult<Vec<Customer>> {
        let customers = self.store.list_customers().await?;
        match search {
            Some(query) => {
                let query = validate_search_query(query)?;
                Ok(customers
                    .into_iter()
                    .filter(|c| customer_matches(c, &query))
                    .collect())
            }
            None => Ok(customers),
        }
    }

    pub async fn get(&self, id: i64) -> ApiResult<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer"))
    }

    pub async fn create(&self, customer: NewCustomer) -> ApiResult<Customer> {
        validate_new_customer(&customer)?;
        Ok(self.store.create_customer(customer).await?)
    }

    pub async fn update(&self, id: i64, patch: CustomerPatch) -> ApiResult<Customer> {
        validate_customer_patch(&patch)?;
        Ok(self.store.update_customer(id, patch).await?)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        Ok(self.store.delete_customer(id).await?)
    }
}
