//! # In-Process Tables
//!
//! The record set held in memory by [`MemoryStore`](crate::memory::MemoryStore)
//! and [`CsvStore`](crate::csv_store::CsvStore). All rules that the SQLite backend
//! gets from its schema (unique SKU, unique username, clamped stock) are
//! enforced here in plain Rust.
//!
//! Callers mutate a clone and publish it only when every step succeeded,
//! which is what makes a settlement all-or-nothing on these backends.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use hearth_core::settlement::{SettledOrder, SettlementPlan};
use hearth_core::{
    Category, Customer, CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, Order,
    OrderItem, OrderWithItems, Payment, Product, ProductPatch, User,
};

use crate::error::{StoreError, StoreResult};

/// One kind of record; CSV keeps one file per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Users,
    Categories,
    Products,
    Customers,
    Orders,
    OrderItems,
    Payments,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Users,
        Kind::Categories,
        Kind::Products,
        Kind::Customers,
        Kind::Orders,
        Kind::OrderItems,
        Kind::Payments,
    ];

    /// Every kind a settlement writes.
    pub const SETTLEMENT: [Kind; 4] = [Kind::Orders, Kind::OrderItems, Kind::Products, Kind::Payments];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Users => "users",
            Kind::Categories => "categories",
            Kind::Products => "products",
            Kind::Customers => "customers",
            Kind::Orders => "orders",
            Kind::OrderItems => "order_items",
            Kind::Payments => "payments",
        }
    }

    pub fn parse(name: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Last id handed out per kind. Ids only ever grow, so a deleted record's
/// id is never handed out again. Backends that outlive the process persist
/// these marks (see [`Tables::high_water_marks`]).
#[derive(Debug, Clone, Default)]
struct IdCounters {
    users: i64,
    categories: i64,
    products: i64,
    customers: i64,
    orders: i64,
    order_items: i64,
    payments: i64,
}

impl IdCounters {
    fn slot(&mut self, kind: Kind) -> &mut i64 {
        match kind {
            Kind::Users => &mut self.users,
            Kind::Categories => &mut self.categories,
            Kind::Products => &mut self.products,
            Kind::Customers => &mut self.customers,
            Kind::Orders => &mut self.orders,
            Kind::OrderItems => &mut self.order_items,
            Kind::Payments => &mut self.payments,
        }
    }

    fn current(&self, kind: Kind) -> i64 {
        match kind {
            Kind::Users => self.users,
            Kind::Categories => self.categories,
            Kind::Products => self.products,
            Kind::Customers => self.customers,
            Kind::Orders => self.orders,
            Kind::OrderItems => self.order_items,
            Kind::Payments => self.payments,
        }
    }

    fn next(&mut self, kind: Kind) -> i64 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }

    /// Makes sure the next id for `kind` is above `id`.
    fn observe(&mut self, kind: Kind, id: i64) {
        let slot = self.slot(kind);
        *slot = (*slot).max(id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: BTreeMap<i64, User>,
    pub categories: BTreeMap<i64, Category>,
    pub products: BTreeMap<i64, Product>,
    pub customers: BTreeMap<i64, Customer>,
    pub orders: BTreeMap<i64, Order>,
    pub order_items: BTreeMap<i64, OrderItem>,
    pub payments: BTreeMap<i64, Payment>,
    ids: IdCounters,
}

impl Tables {
    /// Last id handed out for every kind, deleted records included.
    pub fn high_water_marks(&self) -> [(Kind, i64); 7] {
        Kind::ALL.map(|kind| (kind, self.ids.current(kind)))
    }

    /// Raises the counter for `kind` so the next id is above `id`.
    pub fn observe_id(&mut self, kind: Kind, id: i64) {
        self.ids.observe(kind, id);
    }

    /// Raises the id counters to cover every id still visible in the
    /// records: each table's own ids, plus the product and customer ids
    /// that order history refers to after those rows were deleted.
    pub fn reseed_ids(&mut self) {
        let maxima = [
            (Kind::Users, self.users.keys().next_back()),
            (Kind::Categories, self.categories.keys().next_back()),
            (Kind::Products, self.products.keys().next_back()),
            (Kind::Customers, self.customers.keys().next_back()),
            (Kind::Orders, self.orders.keys().next_back()),
            (Kind::OrderItems, self.order_items.keys().next_back()),
            (Kind::Payments, self.payments.keys().next_back()),
        ]
        .map(|(kind, max)| (kind, max.copied().unwrap_or(0)));

        for (kind, max) in maxima {
            self.ids.observe(kind, max);
        }

        if let Some(max) = self.order_items.values().map(|i| i.product_id).max() {
            self.ids.observe(Kind::Products, max);
        }
        if let Some(max) = self.orders.values().filter_map(|o| o.customer_id).max() {
            self.ids.observe(Kind::Customers, max);
        }
    }

    // =========================================================================
    // Users & Categories
    // =========================================================================

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub fn create_user(&mut self, new: NewUser) -> StoreResult<User> {
        if self.user_by_username(&new.username).is_some() {
            return Err(StoreError::duplicate("username", new.username));
        }

        let user = User {
            id: self.ids.next(Kind::Users),
            username: new.username,
            password: new.password,
            role: new.role,
        };
        debug!(id = user.id, username = %user.username, "Inserting user");
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn create_category(&mut self, new: NewCategory) -> StoreResult<Category> {
        let category = Category {
            id: self.ids.next(Kind::Categories),
            name: new.name,
            description: new.description,
        };
        debug!(id = category.id, name = %category.name, "Inserting category");
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    // =========================================================================
    // Products
    // =========================================================================

    fn check_sku_free(&self, sku: &str, except: Option<i64>) -> StoreResult<()> {
        let taken = self
            .products
            .values()
            .any(|p| p.sku == sku && Some(p.id) != except);
        if taken {
            return Err(StoreError::duplicate("sku", sku));
        }
        Ok(())
    }

    pub fn create_product(&mut self, new: NewProduct) -> StoreResult<Product> {
        self.check_sku_free(&new.sku, None)?;

        let product = new.into_product(self.ids.next(Kind::Products), Utc::now());
        debug!(id = product.id, sku = %product.sku, "Inserting product");
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    pub fn update_product(&mut self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        if let Some(sku) = &patch.sku {
            self.check_sku_free(sku, Some(id))?;
        }

        let product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.apply_patch(patch);
        debug!(id, "Updated product");
        Ok(product.clone())
    }

    pub fn delete_product(&mut self, id: i64) -> StoreResult<()> {
        self.products
            .remove(&id)
            .map(|_| debug!(id, "Deleted product"))
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub fn adjust_stock(&mut self, id: i64, delta: i64) -> StoreResult<Product> {
        let product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.apply_stock_delta(delta);
        debug!(id, delta, stock = product.stock, "Adjusted stock");
        Ok(product.clone())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub fn create_customer(&mut self, new: NewCustomer) -> StoreResult<Customer> {
        let customer = new.into_customer(self.ids.next(Kind::Customers), Utc::now());
        debug!(id = customer.id, "Inserting customer");
        self.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    pub fn update_customer(&mut self, id: i64, patch: CustomerPatch) -> StoreResult<Customer> {
        let customer = self
            .customers
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Customer", id))?;
        customer.apply_patch(patch);
        debug!(id, "Updated customer");
        Ok(customer.clone())
    }

    pub fn delete_customer(&mut self, id: i64) -> StoreResult<()> {
        self.customers
            .remove(&id)
            .map(|_| debug!(id, "Deleted customer"))
            .ok_or_else(|| StoreError::not_found("Customer", id))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub fn order_with_items(&self, id: i64) -> Option<OrderWithItems> {
        let order = self.orders.get(&id)?.clone();
        Some(OrderWithItems {
            items: self
                .order_items
                .values()
                .filter(|i| i.order_id == id)
                .cloned()
                .collect(),
            payments: self
                .payments
                .values()
                .filter(|p| p.order_id == id)
                .cloned()
                .collect(),
            order,
        })
    }

    pub fn order_by_key(&self, key: Uuid) -> Option<OrderWithItems> {
        let id = self
            .orders
            .values()
            .find(|o| o.idempotency_key == Some(key))?
            .id;
        self.order_with_items(id)
    }

    /// Applies a settlement plan. Call on a staged copy.
    pub fn commit_settlement(&mut self, plan: &SettlementPlan) -> StoreResult<SettledOrder> {
        if let Some(existing) = plan.idempotency_key.and_then(|key| self.order_by_key(key)) {
            debug!(order_id = existing.order.id, "Replaying settled order");
            return Ok(SettledOrder::replay(existing));
        }

        let order = plan.order(self.ids.next(Kind::Orders));
        self.orders.insert(order.id, order.clone());

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let item = SettlementPlan::item(line, self.ids.next(Kind::OrderItems), order.id);
            self.order_items.insert(item.id, item.clone());
            items.push(item);
        }

        let mut unstocked_product_ids = Vec::new();
        for (product_id, delta) in plan.stock_deltas() {
            match self.products.get_mut(&product_id) {
                Some(product) => product.apply_stock_delta(delta),
                None => {
                    warn!(order_id = order.id, product_id, "Product missing; stock not adjusted");
                    unstocked_product_ids.push(product_id);
                }
            }
        }

        let mut payments = Vec::with_capacity(plan.payments.len());
        for planned in &plan.payments {
            let payment = plan.payment(planned, self.ids.next(Kind::Payments), order.id);
            self.payments.insert(payment.id, payment.clone());
            payments.push(payment);
        }

        Ok(SettledOrder {
            order,
            items,
            payments,
            unstocked_product_ids,
            replayed: false,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
