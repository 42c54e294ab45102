//! # Memory Store
//!
//! Volatile backend: everything lives in [`Tables`] behind a
//! `tokio::sync::RwLock`. Readers share the lock; every writer takes it
//! exclusively, so two checkouts can never interleave their stock updates.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use hearth_core::settlement::{SettledOrder, SettlementPlan};
use hearth_core::{
    Category, Customer, CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, Order,
    OrderItem, OrderWithItems, Payment, Product, ProductPatch, User,
};

use crate::error::StoreResult;
use crate::store::{RecordStore, StoreHealth};
use crate::tables::Tables;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    /// Runs `f` against a staged copy and publishes it only on success.
    async fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let out = f(&mut staged)?;
        *tables = staged;
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health(&self) -> StoreResult<StoreHealth> {
        Ok(StoreHealth::backend("memory"))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read(|t| t.users.values().cloned().collect()).await)
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.read(|t| t.users.get(&id).cloned()).await)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.read(|t| t.user_by_username(username).cloned()).await)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.write(|t| t.create_user(user)).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read(|t| t.categories.values().cloned().collect()).await)
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        self.write(|t| t.create_category(category)).await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.read(|t| t.products.values().cloned().collect()).await)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.read(|t| t.products.get(&id).cloned()).await)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        self.write(|t| t.create_product(product)).await
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        self.write(|t| t.update_product(id, patch)).await
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.write(|t| t.delete_product(id)).await
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> StoreResult<Product> {
        self.write(|t| t.adjust_stock(id, delta)).await
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.read(|t| t.customers.values().cloned().collect()).await)
    }

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>> {
        Ok(self.read(|t| t.customers.get(&id).cloned()).await)
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
        self.write(|t| t.create_customer(customer)).await
    }

    async fn update_customer(&self, id: i64, patch: CustomerPatch) -> StoreResult<Customer> {
        self.write(|t| t.update_customer(id, patch)).await
    }

    async fn delete_customer(&self, id: i64) -> StoreResult<()> {
        self.write(|t| t.delete_customer(id)).await
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.read(|t| t.orders.values().cloned().collect()).await)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<OrderWithItems>> {
        Ok(self.read(|t| t.order_with_items(id)).await)
    }

    async fn find_order_by_key(&self, key: Uuid) -> StoreResult<Option<OrderWithItems>> {
        Ok(self.read(|t| t.order_by_key(key)).await)
    }

    async fn list_order_items(&self) -> StoreResult<Vec<OrderItem>> {
        Ok(self.read(|t| t.order_items.values().cloned().collect()).await)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        Ok(self.read(|t| t.payments.values().cloned().collect()).await)
    }

    async fn commit_settlement(&self, plan: &SettlementPlan) -> StoreResult<SettledOrder> {
        self.write(|t| t.commit_settlement(plan)).await
    }
}
