//! # Record Store
//!
//! The capability every persistence backend provides. Services hold an
//! `Arc<dyn RecordStore>` chosen at startup and never know which backend
//! is behind it.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    RecordStore implementations                          │
//! │                                                                         │
//! │  Service                                                               │
//! │       │   store.list_products().await?                                 │
//! │       ▼                                                                 │
//! │  Arc<dyn RecordStore>                                                  │
//! │       ├── MemoryStore   BTreeMap tables behind a tokio RwLock          │
//! │       ├── CsvStore      same tables, mirrored to one CSV per kind      │
//! │       └── SqliteStore   sqlx pool, WAL mode, embedded migrations       │
//! │                                                                         │
//! │  Writers are serialized per backend: a write guard for memory/CSV,    │
//! │  a database transaction for SQLite.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use hearth_core::settlement::{SettledOrder, SettlementPlan};
use hearth_core::{
    Category, Customer, CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, Order,
    OrderItem, OrderWithItems, Payment, Product, ProductPatch, User,
};

use crate::error::StoreResult;

/// What `GET /api/health` reports about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    /// `memory`, `csv` or `sqlite`.
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations_applied: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations_embedded: Option<usize>,
}

impl StoreHealth {
    pub fn backend(backend: &'static str) -> Self {
        StoreHealth {
            backend,
            migrations_applied: None,
            migrations_embedded: None,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Confirms the store can answer queries.
    async fn health(&self) -> StoreResult<StoreHealth>;

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Fails with `UniqueViolation` when the username is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn create_category(&self, category: NewCategory) -> StoreResult<Category>;

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// All products in id order.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>>;

    /// Fails with `UniqueViolation` when the SKU is taken.
    async fn create_product(&self, product: NewProduct) -> StoreResult<Product>;

    /// Fails with `NotFound` for an unknown id.
    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product>;

    async fn delete_product(&self, id: i64) -> StoreResult<()>;

    /// Adds `delta` to stock, clamping at zero, and recomputes status.
    async fn adjust_stock(&self, id: i64, delta: i64) -> StoreResult<Product>;

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>>;

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer>;

    async fn update_customer(&self, id: i64, patch: CustomerPatch) -> StoreResult<Customer>;

    async fn delete_customer(&self, id: i64) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    async fn get_order(&self, id: i64) -> StoreResult<Option<OrderWithItems>>;

    async fn find_order_by_key(&self, key: Uuid) -> StoreResult<Option<OrderWithItems>>;

    async fn list_order_items(&self) -> StoreResult<Vec<OrderItem>>;

    async fn list_payments(&self) -> StoreResult<Vec<Payment>>;

    /// Writes a whole settlement atomically.
    ///
    /// ## What This Does
    /// 1. If the plan's idempotency key already names an order, returns that
    ///    order with `replayed = true` and writes nothing
    /// 2. Assigns the order id and `ORD` number, inserts the order
    /// 3. Inserts one item per cart line
    /// 4. Decrements stock per line; lines whose product is gone are
    ///    reported in `unstocked_product_ids` instead of failing
    /// 5. Inserts one payment per planned payment
    ///
    /// Either all of it is visible afterwards or none of it is.
    async fn commit_settlement(&self, plan: &SettlementPlan) -> StoreResult<SettledOrder>;
}
