//! # SQLite Store
//!
//! Durable backend on a sqlx connection pool.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Record Store                                │
//! │                                                                         │
//! │  SqliteConfig::new(path) ← Configure pool settings                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::open(config).await ← Create pool + run migrations        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── reads: any connection, in parallel (WAL)                     │
//! │       └── writes: writer mutex ──► BEGIN ... COMMIT                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers take an in-process mutex before opening their transaction. SQLite
//! allows one writer at a time anyway; queuing them here means a deferred
//! transaction never has to upgrade its read lock under contention.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_core::settlement::{SettledOrder, SettlementPlan};
use hearth_core::{
    Category, Customer, CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, Order,
    OrderItem, OrderWithItems, Payment, Product, ProductPatch, User,
};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::store::{RecordStore, StoreHealth};

// =============================================================================
// Configuration
// =============================================================================

/// SQLite pool configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("./data/hearth.db").max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, created if missing.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Private in-memory database (for tests). A single connection, since
    /// every connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Columns
// =============================================================================

const PRODUCT_COLUMNS: &str = "id, name, sku, category_id, category, counter_price, \
    wholesale_price, custom_price, stock, unit, gst_rate, image_url, barcode, status, created_at";

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, email, address, gst_number, customer_type, balance, created_at";

const ORDER_COLUMNS: &str = "id, order_number, customer_id, customer_name, subtotal, gst_amount, \
    total, payment_method, payment_status, status, idempotency_key, created_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, unit, unit_price, price_type, gst_rate, total";

const PAYMENT_COLUMNS: &str = "id, order_id, method, amount, transaction_id, status, created_at";

// =============================================================================
// Store
// =============================================================================

#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    writer: Mutex<()>,
}

impl SqliteStore {
    /// Opens the pool and applies pending migrations.
    ///
    /// ## What This Does
    /// 1. Creates the database file (and its directory) if needed
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous, foreign keys on
    /// 3. Creates the connection pool
    /// 4. Runs embedded migrations
    pub async fn open(config: SqliteConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing SQLite store"
        );

        let base_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                // Readers don't block the writer and vice versa
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };
        // SQLite ships with foreign keys disabled
        let connect_options = base_options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "SQLite pool created");

        migrations::run_migrations(&pool).await?;

        Ok(SqliteStore {
            pool,
            writer: Mutex::new(()),
        })
    }

    pub async fn close(&self) {
        info!("Closing SQLite pool");
        self.pool.close().await;
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))
    }

    async fn commit(tx: Transaction<'static, Sqlite>) -> StoreResult<()> {
        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))
    }

    async fn fetch_product(
        tx: &mut Transaction<'static, Sqlite>,
        id: i64,
    ) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?)
    }

    async fn write_stock(tx: &mut Transaction<'static, Sqlite>, product: &Product) -> StoreResult<()> {
        sqlx::query("UPDATE products SET stock = ?1, status = ?2 WHERE id = ?3")
            .bind(product.stock)
            .bind(product.status)
            .bind(product.id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn order_with_items(&self, order: Order) -> StoreResult<OrderWithItems> {
        let items_sql =
            format!("SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY id");
        let items = sqlx::query_as::<_, OrderItem>(&items_sql)
            .bind(order.id)
            .fetch_all(&self.pool)
            .await?;

        let payments_sql =
            format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1 ORDER BY id");
        let payments = sqlx::query_as::<_, Payment>(&payments_sql)
            .bind(order.id)
            .fetch_all(&self.pool)
            .await?;

        Ok(OrderWithItems {
            order,
            items,
            payments,
        })
    }

    /// Attaches the offending value to a bare UNIQUE violation.
    fn with_value(err: StoreError, value: &str) -> StoreError {
        match err {
            StoreError::UniqueViolation { field, .. } => StoreError::duplicate(field, value),
            other => other,
        }
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn health(&self) -> StoreResult<StoreHealth> {
        let (embedded, applied) = migrations::migration_status(&self.pool).await?;
        Ok(StoreHealth {
            backend: "sqlite",
            migrations_applied: Some(applied),
            migrations_embedded: Some(embedded),
        })
    }

    // -------------------------------------------------------------------------
    // Users & Categories
    // -------------------------------------------------------------------------

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, username, password, role FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, username, password, role FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, password, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let _guard = self.writer.lock().await;
        debug!(username = %user.username, "Inserting user");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::with_value(e.into(), &user.username))?;

        Ok(User {
            id,
            username: user.username,
            password: user.password,
            role: user.role,
        })
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        let _guard = self.writer.lock().await;
        debug!(name = %category.name, "Inserting category");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES (?1, ?2) RETURNING id",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(Category {
            id,
            name: category.name,
            description: category.description,
        })
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        let _guard = self.writer.lock().await;
        // id 0 is a placeholder; the row id comes back from RETURNING
        let mut product = product.into_product(0, Utc::now());
        debug!(sku = %product.sku, "Inserting product");

        product.id = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                name, sku, category_id, category, counter_price, wholesale_price,
                custom_price, stock, unit, gst_rate, image_url, barcode, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.category_id)
        .bind(&product.category)
        .bind(product.counter_price)
        .bind(product.wholesale_price)
        .bind(product.custom_price)
        .bind(product.stock)
        .bind(&product.unit)
        .bind(product.gst_rate)
        .bind(&product.image_url)
        .bind(&product.barcode)
        .bind(product.status)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::with_value(e.into(), &product.sku))?;

        Ok(product)
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        let _guard = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let mut product = Self::fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.apply_patch(patch);

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?1, sku = ?2, category_id = ?3, category = ?4,
                counter_price = ?5, wholesale_price = ?6, custom_price = ?7,
                stock = ?8, unit = ?9, gst_rate = ?10, image_url = ?11,
                barcode = ?12, status = ?13
            WHERE id = ?14
            "#,
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.category_id)
        .bind(&product.category)
        .bind(product.counter_price)
        .bind(product.wholesale_price)
        .bind(product.custom_price)
        .bind(product.stock)
        .bind(&product.unit)
        .bind(product.gst_rate)
        .bind(&product.image_url)
        .bind(&product.barcode)
        .bind(product.status)
        .bind(product.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::with_value(e.into(), &product.sku))?;

        Self::commit(tx).await?;
        debug!(id, "Updated product");
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        let _guard = self.writer.lock().await;
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        debug!(id, "Deleted product");
        Ok(())
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> StoreResult<Product> {
        let _guard = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let mut product = Self::fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        product.apply_stock_delta(delta);
        Self::write_stock(&mut tx, &product).await?;

        Self::commit(tx).await?;
        debug!(id, delta, stock = product.stock, "Adjusted stock");
        Ok(product)
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id");
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
        let _guard = self.writer.lock().await;
        let mut customer = customer.into_customer(0, Utc::now());
        debug!(name = %customer.name, "Inserting customer");

        customer.id = sqlx::query_scalar(
            r#"
            INSERT INTO customers (
                name, phone, email, address, gst_number, customer_type, balance, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING id
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.gst_number)
        .bind(customer.customer_type)
        .bind(customer.balance)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn update_customer(&self, id: i64, patch: CustomerPatch) -> StoreResult<Customer> {
        let _guard = self.writer.lock().await;
        let mut tx = self.begin().await?;

        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let mut customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("Customer", id))?;
        customer.apply_patch(patch);

        sqlx::query(
            r#"
            UPDATE customers SET
                name = ?1, phone = ?2, email = ?3, address = ?4,
                gst_number = ?5, customer_type = ?6, balance = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.gst_number)
        .bind(customer.customer_type)
        .bind(customer.balance)
        .bind(customer.id)
        .execute(&mut *tx)
        .await?;

        Self::commit(tx).await?;
        debug!(id, "Updated customer");
        Ok(customer)
    }

    async fn delete_customer(&self, id: i64) -> StoreResult<()> {
        let _guard = self.writer.lock().await;
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", id));
        }
        debug!(id, "Deleted customer");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<OrderWithItems>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match order {
            Some(order) => Ok(Some(self.order_with_items(order).await?)),
            None => Ok(None),
        }
    }

    async fn find_order_by_key(&self, key: Uuid) -> StoreResult<Option<OrderWithItems>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE idempotency_key = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match order {
            Some(order) => Ok(Some(self.order_with_items(order).await?)),
            None => Ok(None),
        }
    }

    async fn list_order_items(&self) -> StoreResult<Vec<OrderItem>> {
        let sql = format!("SELECT {ORDER_ITEM_COLUMNS} FROM order_items ORDER BY id");
        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_payments(&self) -> StoreResult<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY id");
        Ok(sqlx::query_as::<_, Payment>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn commit_settlement(&self, plan: &SettlementPlan) -> StoreResult<SettledOrder> {
        let _guard = self.writer.lock().await;

        if let Some(key) = plan.idempotency_key {
            if let Some(existing) = self.find_order_by_key(key).await? {
                debug!(order_id = existing.order.id, "Replaying settled order");
                return Ok(SettledOrder::replay(existing));
            }
        }

        let mut tx = self.begin().await?;

        // Insert with a unique placeholder number, then derive the real one
        // from the assigned id inside the same transaction.
        let draft = plan.order(0);
        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                order_number, customer_id, customer_name, subtotal, gst_amount, total,
                payment_method, payment_status, status, idempotency_key, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING id
            "#,
        )
        .bind(format!("PENDING-{}", Uuid::new_v4()))
        .bind(draft.customer_id)
        .bind(&draft.customer_name)
        .bind(draft.subtotal)
        .bind(draft.gst_amount)
        .bind(draft.total)
        .bind(draft.payment_method)
        .bind(draft.payment_status)
        .bind(draft.status)
        .bind(draft.idempotency_key)
        .bind(draft.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let order = plan.order(order_id);
        sqlx::query("UPDATE orders SET order_number = ?1 WHERE id = ?2")
            .bind(&order.order_number)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        let mut items = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let mut item = SettlementPlan::item(line, 0, order.id);
            item.id = sqlx::query_scalar(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, product_name, quantity, unit,
                    unit_price, price_type, gst_rate, total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                RETURNING id
                "#,
            )
            .bind(item.order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.unit_price)
            .bind(item.price_type)
            .bind(item.gst_rate)
            .bind(item.total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        let mut unstocked_product_ids = Vec::new();
        for (product_id, delta) in plan.stock_deltas() {
            match Self::fetch_product(&mut tx, product_id).await? {
                Some(mut product) => {
                    product.apply_stock_delta(delta);
                    Self::write_stock(&mut tx, &product).await?;
                }
                None => {
                    warn!(order_id = order.id, product_id, "Product missing; stock not adjusted");
                    unstocked_product_ids.push(product_id);
                }
            }
        }

        let mut payments = Vec::with_capacity(plan.payments.len());
        for planned in &plan.payments {
            let mut payment = plan.payment(planned, 0, order.id);
            payment.id = sqlx::query_scalar(
                r#"
                INSERT INTO payments (order_id, method, amount, transaction_id, status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING id
                "#,
            )
            .bind(payment.order_id)
            .bind(payment.method)
            .bind(payment.amount)
            .bind(&payment.transaction_id)
            .bind(payment.status)
            .bind(payment.created_at)
            .fetch_one(&mut *tx)
            .await?;
            payments.push(payment);
        }

        Self::commit(tx).await?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::settlement::{plan_settlement, CartLine, PaymentInput, SettlementInput};
    use hearth_core::{CustomerType, Money, OrderStatus, PaymentMethod, PriceType, ProductStatus, TaxRate};

    async fn store() -> SqliteStore {
        SqliteStore::open(SqliteConfig::in_memory()).await.unwrap()
    }

    fn gulab_jamun() -> NewProduct {
        NewProduct {
            name: "Gulab Jamun".to_string(),
            sku: "GJ001".to_string(),
            category_id: None,
            category: "Sweets".to_string(),
            counter_price: Money::from_minor(8000),
            wholesale_price: Money::from_minor(7000),
            custom_price: None,
            stock: 5,
            unit: "kg".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
    }

    fn settlement(product: &Product, quantity: i64, key: Option<Uuid>) -> SettlementPlan {
        let line = CartLine::snapshot(product, PriceType::Counter, product.counter_price, quantity);
        let total = hearth_core::settlement::compute_totals(std::slice::from_ref(&line)).total;
        let input = SettlementInput {
            lines: vec![line],
            customer_id: None,
            customer_name: String::new(),
            payments: vec![PaymentInput::new(PaymentMethod::Card, total)],
            idempotency_key: key,
        };
        plan_settlement(input, Utc::now(), || 9).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_migrations() {
        let health = store().await.health().await.unwrap();
        assert_eq!(health.backend, "sqlite");
        assert_eq!(health.migrations_applied, health.migrations_embedded);
    }

    #[tokio::test]
    async fn test_product_round_trip() {
        let store = store().await;
        let created = store.create_product(gulab_jamun()).await.unwrap();

        let loaded = store.get_product(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.sku, "GJ001");
        assert_eq!(loaded.counter_price, Money::from_minor(8000));
        assert_eq!(loaded.status, ProductStatus::LowStock);
    }

    #[tokio::test]
    async fn test_duplicate_sku_names_value() {
        let store = store().await;
        store.create_product(gulab_jamun()).await.unwrap();

        match store.create_product(gulab_jamun()).await {
            Err(StoreError::UniqueViolation { field, value }) => {
                assert_eq!(field, "sku");
                assert_eq!(value, "GJ001");
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = store().await;
        assert!(matches!(
            store.delete_product(404).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.adjust_stock(404, -1).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_customer_update() {
        let store = store().await;
        let created = store
            .create_customer(NewCustomer {
                name: "Mike Chen".to_string(),
                phone: Some("9876543211".to_string()),
                email: None,
                address: None,
                gst_number: None,
                customer_type: CustomerType::Wholesale,
                balance: Money::zero(),
            })
            .await
            .unwrap();

        let patch: CustomerPatch = serde_json::from_str(r#"{"email": "mike@email.com"}"#).unwrap();
        let updated = store.update_customer(created.id, patch).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("mike@email.com"));
        assert_eq!(updated.customer_type, CustomerType::Wholesale);
    }

    #[tokio::test]
    async fn test_settlement_oversell_clamps_stock() {
        let store = store().await;
        let product = store.create_product(gulab_jamun()).await.unwrap();

        let settled = store
            .commit_settlement(&settlement(&product, 8, None))
            .await
            .unwrap();

        assert_eq!(settled.order.order_number, format!("ORD{:06}", settled.order.id));
        assert_eq!(settled.order.status, OrderStatus::Completed);
        let after = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 0);

        let stored = store.get_order(settled.order.id).await.unwrap().unwrap();
        assert_eq!(stored.items, settled.items);
        assert_eq!(stored.payments, settled.payments);
    }

    #[tokio::test]
    async fn test_settlement_replay_and_deleted_product() {
        let store = store().await;
        let product = store.create_product(gulab_jamun()).await.unwrap();
        let plan = settlement(&product, 1, Some(Uuid::new_v4()));
        store.delete_product(product.id).await.unwrap();

        let first = store.commit_settlement(&plan).await.unwrap();
        assert_eq!(first.unstocked_product_ids, vec![product.id]);

        let second = store.commit_settlement(&plan).await.unwrap();
        assert!(second.replayed);
        assert_eq!(second.order.id, first.order.id);
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }
}
