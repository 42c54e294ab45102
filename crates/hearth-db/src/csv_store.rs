//! # CSV Store
//!
//! File-backed backend: one CSV file per record kind in a data directory.
//!
//! ## File Layout
//! ```text
//! data/
//! ├── users.csv          id,username,password,role
//! ├── categories.csv     id,name,description
//! ├── products.csv       id,name,sku,categoryId,...,status,createdAt
//! ├── customers.csv
//! ├── orders.csv
//! ├── order_items.csv
//! ├── payments.csv
//! ├── sequences.csv      kind,lastId   (last id handed out per kind)
//! └── journal.csv        only while a committed write is being promoted
//! ```
//!
//! `sequences.csv` keeps ids from being reused after the newest record of a
//! kind is deleted and the store is reopened.
//!
//! ## Cell Encoding
//! Every cell holds the JSON encoding of its value:
//!
//! | Value            | Cell          |
//! |------------------|---------------|
//! | `None`           | `null`        |
//! | `Some("")`       | `""`          |
//! | `"12345"` (text) | `"12345"`     |
//! | `42` (integer)   | `42`          |
//!
//! so an absent value, an empty string and a numeric-looking string never
//! collide.
//!
//! ## Write Path
//! ```text
//! write lock ──► finish any pending journal ──► clone tables ──► apply change
//!     ──► write <file>.tmp for touched kinds + sequences.csv
//!     ──► write journal.csv (commit point) ──► publish clone
//!     ──► rename each <file>.tmp over <file> ──► remove journal.csv
//! ```
//! A failure before the journal lands leaves the files and the in-memory
//! tables as they were; leftover temp files are removed. Once the journal
//! is in place the write is committed: a rename that fails afterwards is
//! logged, and the remaining renames are finished by the next write or by
//! [`CsvStore::open`], which replays the journal before loading anything.
//! Further writes are refused until the journal has been finished, so the
//! files never stay half-updated behind a newer write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use hearth_core::settlement::{SettledOrder, SettlementPlan};
use hearth_core::{
    Category, Customer, CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, Order,
    OrderItem, OrderWithItems, Payment, Product, ProductPatch, User,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{RecordStore, StoreHealth};
use crate::tables::{Kind, Tables};

// =============================================================================
// Files & Columns
// =============================================================================

fn file_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Users => "users.csv",
        Kind::Categories => "categories.csv",
        Kind::Products => "products.csv",
        Kind::Customers => "customers.csv",
        Kind::Orders => "orders.csv",
        Kind::OrderItems => "order_items.csv",
        Kind::Payments => "payments.csv",
    }
}

const SEQUENCES_FILE: &str = "sequences.csv";
const JOURNAL_FILE: &str = "journal.csv";

fn temp_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(format!("{}.tmp", file))
}

/// Files a journal may name. Anything else in a journal is rejected.
fn is_data_file(file: &str) -> bool {
    file == SEQUENCES_FILE || Kind::ALL.iter().any(|&kind| file_name(kind) == file)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SequenceRow {
    kind: String,
    last_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct JournalRow {
    file: String,
}

fn columns(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Users => &["id", "username", "password", "role"],
        Kind::Categories => &["id", "name", "description"],
        Kind::Products => &[
            "id",
            "name",
            "sku",
            "categoryId",
            "category",
            "counterPrice",
            "wholesalePrice",
            "customPrice",
            "stock",
            "unit",
            "gstRate",
            "imageUrl",
            "barcode",
            "status",
            "createdAt",
        ],
        Kind::Customers => &[
            "id",
            "name",
            "phone",
            "email",
            "address",
            "gstNumber",
            "customerType",
            "balance",
            "createdAt",
        ],
        Kind::Orders => &[
            "id",
            "orderNumber",
            "customerId",
            "customerName",
            "subtotal",
            "gstAmount",
            "total",
            "paymentMethod",
            "paymentStatus",
            "status",
            "idempotencyKey",
            "createdAt",
        ],
        Kind::OrderItems => &[
            "id",
            "orderId",
            "productId",
            "productName",
            "quantity",
            "unit",
            "unitPrice",
            "priceType",
            "gstRate",
            "total",
        ],
        Kind::Payments => &[
            "id",
            "orderId",
            "method",
            "amount",
            "transactionId",
            "status",
            "createdAt",
        ],
    }
}

// =============================================================================
// Cell Codec
// =============================================================================

/// Encodes rows as CSV with JSON cells.
fn encode_rows<'a, T, I>(file: &str, columns: &[&str], rows: I) -> StoreResult<Vec<u8>>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;

    for row in rows {
        let value = serde_json::to_value(row).map_err(|e| StoreError::encoding(file, e))?;
        let Value::Object(mut fields) = value else {
            return Err(StoreError::encoding(file, "record is not an object"));
        };

        let mut cells = Vec::with_capacity(columns.len());
        for column in columns {
            let cell = fields.remove(*column).unwrap_or(Value::Null);
            cells.push(serde_json::to_string(&cell).map_err(|e| StoreError::encoding(file, e))?);
        }
        writer.write_record(&cells)?;
    }

    writer
        .into_inner()
        .map_err(|e| StoreError::encoding(file, e.error()))
}

/// Decodes CSV with JSON cells. Columns are matched by header name.
fn decode_rows<T: DeserializeOwned>(file: &str, bytes: &[u8]) -> StoreResult<Vec<T>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let mut fields = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let value: Value = serde_json::from_str(cell).map_err(|e| {
                StoreError::encoding(file, format!("row {}, column {}: {}", line + 1, header, e))
            })?;
            fields.insert(header.to_string(), value);
        }
        let row = serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::encoding(file, format!("row {}: {}", line + 1, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

fn encode_kind(tables: &Tables, kind: Kind) -> StoreResult<Vec<u8>> {
    let (file, columns) = (file_name(kind), columns(kind));
    match kind {
        Kind::Users => encode_rows(file, columns, tables.users.values()),
        Kind::Categories => encode_rows(file, columns, tables.categories.values()),
        Kind::Products => encode_rows(file, columns, tables.products.values()),
        Kind::Customers => encode_rows(file, columns, tables.customers.values()),
        Kind::Orders => encode_rows(file, columns, tables.orders.values()),
        Kind::OrderItems => encode_rows(file, columns, tables.order_items.values()),
        Kind::Payments => encode_rows(file, columns, tables.payments.values()),
    }
}

fn encode_sequences(tables: &Tables) -> StoreResult<Vec<u8>> {
    let rows: Vec<SequenceRow> = tables
        .high_water_marks()
        .into_iter()
        .map(|(kind, last_id)| SequenceRow {
            kind: kind.as_str().to_string(),
            last_id,
        })
        .collect();
    encode_rows(SEQUENCES_FILE, &["kind", "lastId"], &rows)
}

fn decode_sequences(tables: &mut Tables, bytes: &[u8]) -> StoreResult<()> {
    for row in decode_rows::<SequenceRow>(SEQUENCES_FILE, bytes)? {
        let kind = Kind::parse(&row.kind).ok_or_else(|| {
            StoreError::encoding(SEQUENCES_FILE, format!("unknown kind '{}'", row.kind))
        })?;
        tables.observe_id(kind, row.last_id);
    }
    Ok(())
}

fn index_by_id<T, F>(rows: Vec<T>, id: F) -> BTreeMap<i64, T>
where
    F: Fn(&T) -> i64,
{
    rows.into_iter().map(|row| (id(&row), row)).collect()
}

fn decode_kind(tables: &mut Tables, kind: Kind, bytes: &[u8]) -> StoreResult<usize> {
    let file = file_name(kind);
    let count = match kind {
        Kind::Users => {
            tables.users = index_by_id(decode_rows::<User>(file, bytes)?, |r| r.id);
            tables.users.len()
        }
        Kind::Categories => {
            tables.categories = index_by_id(decode_rows::<Category>(file, bytes)?, |r| r.id);
            tables.categories.len()
        }
        Kind::Products => {
            tables.products = index_by_id(decode_rows::<Product>(file, bytes)?, |r| r.id);
            tables.products.len()
        }
        Kind::Customers => {
            tables.customers = index_by_id(decode_rows::<Customer>(file, bytes)?, |r| r.id);
            tables.customers.len()
        }
        Kind::Orders => {
            tables.orders = index_by_id(decode_rows::<Order>(file, bytes)?, |r| r.id);
            tables.orders.len()
        }
        Kind::OrderItems => {
            tables.order_items = index_by_id(decode_rows::<OrderItem>(file, bytes)?, |r| r.id);
            tables.order_items.len()
        }
        Kind::Payments => {
            tables.payments = index_by_id(decode_rows::<Payment>(file, bytes)?, |r| r.id);
            tables.payments.len()
        }
    };
    Ok(count)
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug)]
pub struct CsvStore {
    dir: PathBuf,
    tables: RwLock<Tables>,
}

impl CsvStore {
    /// Opens (creating if needed) the data directory and loads every file.
    /// Missing files are treated as empty tables.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "Opening CSV store");

        finish_journal(&dir).await?;
        remove_stale_temps(&dir).await?;

        let mut tables = Tables::default();
        for kind in Kind::ALL {
            let path = dir.join(file_name(kind));
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let count = decode_kind(&mut tables, kind, &bytes)?;
                    debug!(file = file_name(kind), count, "Loaded records");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(file = file_name(kind), "No file yet");
                }
                Err(e) => return Err(e.into()),
            }
        }
        match tokio::fs::read(dir.join(SEQUENCES_FILE)).await {
            Ok(bytes) => decode_sequences(&mut tables, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = SEQUENCES_FILE, "No file yet");
            }
            Err(e) => return Err(e.into()),
        }
        tables.reseed_ids();

        Ok(CsvStore {
            dir,
            tables: RwLock::new(tables),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    /// Applies `f` to a staged copy, commits the files for `kinds` (plus
    /// `sequences.csv`) through the journal, then publishes the copy.
    async fn write<T>(
        &self,
        kinds: &[Kind],
        f: impl FnOnce(&mut Tables) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut tables = self.tables.write().await;
        finish_journal(&self.dir).await?;

        let mut staged = tables.clone();
        let out = f(&mut staged)?;

        let mut files = Vec::with_capacity(kinds.len() + 1);
        for &kind in kinds {
            files.push((file_name(kind), encode_kind(&staged, kind)?));
        }
        files.push((SEQUENCES_FILE, encode_sequences(&staged)?));

        if let Err(e) = self.stage(&files).await {
            remove_stale_temps(&self.dir).await.ok();
            return Err(e);
        }

        // Committed from here on
        *tables = staged;

        let names: Vec<&str> = files.iter().map(|(file, _)| *file).collect();
        if let Err(e) = promote(&self.dir, &names).await {
            error!(error = %e, "Committed CSV write not fully promoted; journal kept for replay");
        }
        Ok(out)
    }

    /// Writes every temp file, then the journal naming them.
    async fn stage(&self, files: &[(&str, Vec<u8>)]) -> StoreResult<()> {
        for (file, bytes) in files {
            tokio::fs::write(temp_path(&self.dir, file), bytes).await?;
        }

        let rows: Vec<JournalRow> = files
            .iter()
            .map(|(file, _)| JournalRow {
                file: file.to_string(),
            })
            .collect();
        let journal = encode_rows(JOURNAL_FILE, &["file"], &rows)?;
        let temp = temp_path(&self.dir, JOURNAL_FILE);
        tokio::fs::write(&temp, journal).await?;
        tokio::fs::rename(&temp, self.dir.join(JOURNAL_FILE)).await?;
        Ok(())
    }
}

/// Renames each staged temp file over its target, then drops the journal.
/// A missing temp file was already promoted by an earlier attempt.
async fn promote(dir: &Path, files: &[&str]) -> StoreResult<()> {
    for file in files {
        match tokio::fs::rename(temp_path(dir, file), dir.join(file)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    tokio::fs::remove_file(dir.join(JOURNAL_FILE)).await?;
    Ok(())
}

/// Finishes a write that committed but did not complete its renames.
async fn finish_journal(dir: &Path) -> StoreResult<()> {
    let bytes = match tokio::fs::read(dir.join(JOURNAL_FILE)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let rows: Vec<JournalRow> = decode_rows(JOURNAL_FILE, &bytes)?;
    if let Some(row) = rows.iter().find(|row| !is_data_file(&row.file)) {
        return Err(StoreError::encoding(
            JOURNAL_FILE,
            format!("unexpected file '{}'", row.file),
        ));
    }

    let names: Vec<&str> = rows.iter().map(|row| row.file.as_str()).collect();
    warn!(files = ?names, "Finishing interrupted CSV write");
    promote(dir, &names).await
}

/// Removes temp files of writes that never reached their journal.
async fn remove_stale_temps(dir: &Path) -> StoreResult<()> {
    let files = Kind::ALL
        .iter()
        .map(|&kind| file_name(kind))
        .chain([SEQUENCES_FILE, JOURNAL_FILE]);
    for file in files {
        match tokio::fs::remove_file(temp_path(dir, file)).await {
            Ok(()) => debug!(file, "Removed stale temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[async_trait]
impl RecordStore for CsvStore {
    async fn health(&self) -> StoreResult<StoreHealth> {
        Ok(StoreHealth::backend("csv"))
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
        self.write(&[Kind::Users], |t| t.create_user(user)).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read(|t| t.categories.values().cloned().collect()).await)
    }

    async fn create_category(&self, category: NewCategory) -> StoreResult<Category> {
        self.write(&[Kind::Categories], |t| t.create_category(category))
            .await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.read(|t| t.products.values().cloned().collect()).await)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.read(|t| t.products.get(&id).cloned()).await)
    }

    async fn create_product(&self, product: NewProduct) -> StoreResult<Product> {
        self.write(&[Kind::Products], |t| t.create_product(product))
            .await
    }

    async fn update_product(&self, id: i64, patch: ProductPatch) -> StoreResult<Product> {
        self.write(&[Kind::Products], |t| t.update_product(id, patch))
            .await
    }

    async fn delete_product(&self, id: i64) -> StoreResult<()> {
        self.write(&[Kind::Products], |t| t.delete_product(id)).await
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> StoreResult<Product> {
        self.write(&[Kind::Products], |t| t.adjust_stock(id, delta))
            .await
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.read(|t| t.customers.values().cloned().collect()).await)
    }

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>> {
        Ok(self.read(|t| t.customers.get(&id).cloned()).await)
    }

    async fn create_customer(&self, customer: NewCustomer) -> StoreResult<Customer> {
        self.write(&[Kind::Customers], |t| t.create_customer(customer))
            .await
    }

    async fn update_customer(&self, id: i64, patch: CustomerPatch) -> StoreResult<Customer> {
        self.write(&[Kind::Customers], |t| t.update_customer(id, patch))
            .await
    }

    async fn delete_customer(&self, id: i64) -> StoreResult<()> {
        self.write(&[Kind::Customers], |t| t.delete_customer(id))
            .await
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
        self.write(&Kind::SETTLEMENT, |t| t.commit_settlement(plan))
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
