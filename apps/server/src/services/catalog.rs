//! Catalog service: products and categories.

use std::sync::Arc;

use tracing::debug;

use hearth_core::filter::ProductFilter;
use hearth_core::validation::{
    validate_new_category, validate_new_product, validate_product_patch, validate_search_query,
};
use hearth_core::{Category, NewCategory, NewProduct, Product, ProductPatch};
use hearth_db::RecordStore;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        CatalogService { store }
    }

    /// Products matching `filter`, in id order.
    pub async fn list_products(&self, mut filter: ProductFilter) -> ApiResult<Vec<Product>> {
        if let Some(search) = filter.search.take() {
            filter.search = Some(validate_search_query(&search)?);
        }

        let products = self.store.list_products().await?;
        let total = products.len();
        let matched = filter.apply(products);
        debug!(total, matched = matched.len(), "Listed products");
        Ok(matched)
    }

    pub async fn get_product(&self, id: i64) -> ApiResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product"))
    }

    pub async fn create_product(&self, product: NewProduct) -> ApiResult<Product> {
        validate_new_product(&product)?;
        Ok(self.store.create_product(product).await?)
    }

    pub async fn update_product(&self, id: i64, patch: ProductPatch) -> ApiResult<Product> {
        validate_product_patch(&patch)?;
        Ok(self.store.update_product(id, patch).await?)
    }

    pub async fn delete_product(&self, id: i64) -> ApiResult<()> {
        Ok(self.store.delete_product(id).await?)
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn create_category(&self, category: NewCategory) -> ApiResult<Category> {
        validate_new_category(&category)?;
        Ok(self.store.create_category(category).await?)
    }
}
