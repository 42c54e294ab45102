//! # Domain Types
//!
//! Core domain types used throughout Hearth POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  sku (unique)   │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  3 price tiers  │   │  status         │   │  method         │       │
//! │  │  stock, status  │   │  total          │   │  amount         │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │   OrderItem     │   │    Category     │       │
//! │  │  walk_in /      │   │  name snapshot  │   │  name           │       │
//! │  │  regular /      │   │  price snapshot │   │  description    │       │
//! │  │  wholesale      │   │  price_type     │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are positive integers assigned by the record store, monotonically
//! increasing and never reused. Orders also carry a human-facing
//! `order_number` (`ORD000042`).
//!
//! ## Wire Format
//! JSON uses camelCase keys and snake_case enum tags, matching the browser
//! front end (`gstRate: "18.00"`, `status: "low_stock"`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate in basis points (1800 = 18.00%).
///
/// Serialized as a percentage string with two places (`"18.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct TaxRate(u32);

impl TaxRate {
    /// Standard GST slab applied when a product omits its rate.
    pub const DEFAULT_GST: TaxRate = TaxRate(1800);

    /// Upper bound: 100%.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Percentage as a two-place decimal (`1800` → `18.00`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0 as i64, 2)
    }

    /// Parses a percentage decimal. Rejects negatives and values above 100.
    pub fn from_decimal(percent: Decimal) -> Option<TaxRate> {
        let bps = Money::from_decimal(percent)?.minor();
        if (0..=TaxRate::MAX_BPS as i64).contains(&bps) {
            Some(TaxRate(bps as u32))
        } else {
            None
        }
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for TaxRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let percent = <Decimal as Deserialize>::deserialize(deserializer)?;
        TaxRate::from_decimal(percent).ok_or_else(|| {
            serde::de::Error::custom(format!("GST rate must be between 0 and 100: {}", percent))
        })
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Role of a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    Cashier,
}

/// Product availability, derived from stock unless manually deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    /// Stock at or below [`LOW_STOCK_THRESHOLD`].
    LowStock,
    /// Manually taken off sale. Never produced by stock changes.
    Inactive,
}

impl ProductStatus {
    /// Status implied by a stock level.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::ProductStatus;
    ///
    /// assert_eq!(ProductStatus::for_stock(10), ProductStatus::LowStock);
    /// assert_eq!(ProductStatus::for_stock(11), ProductStatus::Active);
    /// ```
    pub fn for_stock(stock: i64) -> Self {
        if stock <= LOW_STOCK_THRESHOLD {
            ProductStatus::LowStock
        } else {
            ProductStatus::Active
        }
    }
}

/// Customer segment. Wholesale customers usually get wholesale pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    WalkIn,
    #[default]
    Regular,
    Wholesale,
}

/// Which price tier a cart line was priced from.
///
/// Unknown tags deserialize as [`PriceType::Counter`], the same fallback
/// [`crate::pricing::resolve_price`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    #[default]
    Counter,
    Wholesale,
    Custom,
}

impl PriceType {
    /// Lenient parse: anything unrecognised is a counter sale.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "wholesale" => PriceType::Wholesale,
            "custom" => PriceType::Custom,
            _ => PriceType::Counter,
        }
    }
}

impl<'de> Deserialize<'de> for PriceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(PriceType::parse(&tag))
    }
}

/// Tender type. `Split` only appears on orders paid with several payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Wallet,
    Split,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Split => "split",
        }
    }
}

/// Settlement state of money for an order or a single payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Lifecycle of an order.
///
/// ```text
/// processing ──(payments reconcile)──► completed
///      │
///      └──(not implemented yet)──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Users & Categories
// =============================================================================

/// Staff account. The password is stored as given; see [`UserProfile`] for
/// the shape that leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,

    /// Stock Keeping Unit, unique across the catalog.
    pub sku: String,

    /// Optional link to a [`Category`] row. Filtering uses `category`.
    pub category_id: Option<i64>,

    /// Category name; the catalog filters on this exact string.
    pub category: String,

    #[ts(type = "string")]
    pub counter_price: Money,
    #[ts(type = "string")]
    pub wholesale_price: Money,
    /// Negotiated price; falls back to `counter_price` when absent.
    #[ts(type = "string | null")]
    pub custom_price: Option<Money>,

    /// Units on hand, never negative.
    pub stock: i64,

    /// Selling unit label: "piece", "kg", "loaf".
    pub unit: String,

    #[ts(type = "string")]
    pub gst_rate: TaxRate,

    pub image_url: Option<String>,
    pub barcode: Option<String>,
    pub status: ProductStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Applies a stock change, clamping at zero, and recomputes status.
    ///
    /// ## Example
    /// ```text
    /// stock 3, delta -5  →  stock 0, status low_stock
    /// stock 8, delta +10 →  stock 18, status active
    /// inactive product   →  stock changes, stays inactive
    /// ```
    pub fn apply_stock_delta(&mut self, delta: i64) {
        self.set_stock(self.stock.saturating_add(delta));
    }

    /// Sets stock (clamped at zero) and recomputes status.
    pub fn set_stock(&mut self, stock: i64) {
        self.stock = stock.max(0);
        if self.status != ProductStatus::Inactive {
            self.status = ProductStatus::for_stock(self.stock);
        }
    }

    /// Merges a partial update. Status follows stock unless the patch sets
    /// it explicitly.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(price) = patch.counter_price {
            self.counter_price = price;
        }
        if let Some(price) = patch.wholesale_price {
            self.wholesale_price = price;
        }
        if let Some(price) = patch.custom_price {
            self.custom_price = price;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        if let Some(rate) = patch.gst_rate {
            self.gst_rate = rate;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(barcode) = patch.barcode {
            self.barcode = barcode;
        }
        if let Some(stock) = patch.stock {
            self.set_stock(stock);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Payload for creating a product. Status is derived from stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub category: String,
    pub counter_price: Money,
    pub wholesale_price: Money,
    #[serde(default)]
    pub custom_price: Option<Money>,
    #[serde(default)]
    pub stock: i64,
    pub unit: String,
    #[serde(default = "default_gst_rate")]
    pub gst_rate: TaxRate,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

fn default_gst_rate() -> TaxRate {
    TaxRate::DEFAULT_GST
}

impl NewProduct {
    /// Builds the stored record once the store has assigned an id.
    pub fn into_product(self, id: i64, created_at: DateTime<Utc>) -> Product {
        let stock = self.stock.max(0);
        Product {
            id,
            name: self.name,
            sku: self.sku,
            category_id: self.category_id,
            category: self.category,
            counter_price: self.counter_price,
            wholesale_price: self.wholesale_price,
            custom_price: self.custom_price,
            stock,
            unit: self.unit,
            gst_rate: self.gst_rate,
            image_url: self.image_url,
            barcode: self.barcode,
            status: ProductStatus::for_stock(stock),
            created_at,
        }
    }
}

/// Partial product update (`PUT /api/products/{id}`).
///
/// Nullable fields use `Option<Option<T>>`: absent leaves the value alone,
/// `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    pub category: Option<String>,
    pub counter_price: Option<Money>,
    pub wholesale_price: Option<Money>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_price: Option<Option<Money>>,
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub gst_rate: Option<TaxRate>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub barcode: Option<Option<String>>,
    pub status: Option<ProductStatus>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub customer_type: CustomerType,
    /// Informational account balance; settlement never touches it.
    #[ts(type = "string")]
    pub balance: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn apply_patch(&mut self, patch: CustomerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(gst_number) = patch.gst_number {
            self.gst_number = gst_number;
        }
        if let Some(customer_type) = patch.customer_type {
            self.customer_type = customer_type;
        }
        if let Some(balance) = patch.balance {
            self.balance = balance;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default)]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub balance: Money,
}

impl NewCustomer {
    pub fn into_customer(self, id: i64, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            gst_number: self.gst_number,
            customer_type: self.customer_type,
            balance: self.balance,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gst_number: Option<Option<String>>,
    pub customer_type: Option<CustomerType>,
    pub balance: Option<Money>,
}

// =============================================================================
// Order, Order Item, Payment
// =============================================================================

/// A settled (or partially paid) sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// `ORD` + zero-padded id, e.g. `ORD000042`.
    pub order_number: String,
    pub customer_id: Option<i64>,
    /// Customer name at time of sale (frozen).
    pub customer_name: String,
    #[ts(type = "string")]
    pub subtotal: Money,
    #[ts(type = "string")]
    pub gst_amount: Money,
    #[ts(type = "string")]
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    /// Client-generated key that makes resubmission safe.
    #[ts(as = "Option<String>")]
    pub idempotency_key: Option<Uuid>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Formats the human-facing order number for an id.
///
/// ```rust
/// assert_eq!(hearth_core::types::order_number(42), "ORD000042");
/// ```
pub fn order_number(id: i64) -> String {
    format!("ORD{:06}", id)
}

/// A line of an order. Uses the snapshot pattern: name, price, tier and GST
/// rate are frozen at the moment the line was added to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit: String,
    #[ts(type = "string")]
    pub unit_price: Money,
    pub price_type: PriceType,
    #[ts(type = "string")]
    pub gst_rate: TaxRate,
    /// `quantity × unit_price`, before GST.
    #[ts(type = "string")]
    pub total: Money,
}

/// One tender applied to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    #[ts(type = "string")]
    pub amount: Money,
    /// `TXN<millis><0-999>` unless the caller supplied one.
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An order with its lines and payments (`GET /api/orders/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Distinguishes a missing field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        NewProduct {
            name: "Butter Croissant".to_string(),
            sku: "BC001".to_string(),
            category_id: None,
            category: "Pastries".to_string(),
            counter_price: Money::from_minor(5000),
            wholesale_price: Money::from_minor(4000),
            custom_price: None,
            stock,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
        .into_product(1, Utc::now())
    }

    #[test]
    fn test_tax_rate_wire_format() {
        assert_eq!(serde_json::to_string(&TaxRate::from_bps(1800)).unwrap(), "\"18.00\"");
        assert_eq!(serde_json::to_string(&TaxRate::from_bps(525)).unwrap(), "\"5.25\"");

        let parsed: TaxRate = serde_json::from_str("\"5.00\"").unwrap();
        assert_eq!(parsed.bps(), 500);
        let parsed: TaxRate = serde_json::from_str("12").unwrap();
        assert_eq!(parsed.bps(), 1200);

        assert!(serde_json::from_str::<TaxRate>("\"101\"").is_err());
        assert!(serde_json::from_str::<TaxRate>("\"-1\"").is_err());
    }

    #[test]
    fn test_status_threshold() {
        assert_eq!(ProductStatus::for_stock(0), ProductStatus::LowStock);
        assert_eq!(ProductStatus::for_stock(10), ProductStatus::LowStock);
        assert_eq!(ProductStatus::for_stock(11), ProductStatus::Active);
    }

    #[test]
    fn test_new_product_derives_status() {
        assert_eq!(product(12).status, ProductStatus::Active);
        assert_eq!(product(10).status, ProductStatus::LowStock);
        assert_eq!(product(-4).stock, 0);
    }

    #[test]
    fn test_stock_delta_clamps_at_zero() {
        let mut p = product(3);
        p.apply_stock_delta(-5);
        assert_eq!(p.stock, 0);
        assert_eq!(p.status, ProductStatus::LowStock);

        p.apply_stock_delta(20);
        assert_eq!(p.stock, 20);
        assert_eq!(p.status, ProductStatus::Active);
    }

    #[test]
    fn test_inactive_survives_stock_change() {
        let mut p = product(30);
        p.status = ProductStatus::Inactive;
        p.apply_stock_delta(-25);
        assert_eq!(p.stock, 5);
        assert_eq!(p.status, ProductStatus::Inactive);
    }

    #[test]
    fn test_patch_distinguishes_null_from_missing() {
        let mut p = product(20);
        p.custom_price = Some(Money::from_minor(4500));
        p.barcode = Some("1234567890126".to_string());

        let patch: ProductPatch =
            serde_json::from_str(r#"{"customPrice": null, "stock": 4}"#).unwrap();
        p.apply_patch(patch);

        assert_eq!(p.custom_price, None);
        assert_eq!(p.barcode.as_deref(), Some("1234567890126"));
        assert_eq!(p.stock, 4);
        assert_eq!(p.status, ProductStatus::LowStock);
    }

    #[test]
    fn test_price_type_lenient() {
        let parsed: PriceType = serde_json::from_str("\"wholesale\"").unwrap();
        assert_eq!(parsed, PriceType::Wholesale);
        let parsed: PriceType = serde_json::from_str("\"retail\"").unwrap();
        assert_eq!(parsed, PriceType::Counter);
    }

    #[test]
    fn test_order_number_format() {
        assert_eq!(order_number(1), "ORD000001");
        assert_eq!(order_number(1234567), "ORD1234567");
    }

    #[test]
    fn test_product_json_is_camel_case() {
        let json = serde_json::to_value(product(25)).unwrap();
        assert_eq!(json["counterPrice"], "50.00");
        assert_eq!(json["gstRate"], "18.00");
        assert_eq!(json["status"], "active");
        assert!(json["customPrice"].is_null());
    }
}
