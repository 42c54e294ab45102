//! # hearth-core: Bakery Point-of-Sale Rules
//!
//! Everything Hearth POS decides about prices, carts, payments and orders
//! lives here as plain functions over plain data. The crate performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser (POS page)                           │   │
//! │  │   Product grid ──► Cart ──► Tender ──► POST /api/orders         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hearth-server (axum)                         │   │
//! │  │   catalog, customers, settlement engine, dashboard metrics      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hearth-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │   cart   │ │ tender │ │ metrics │  │   │
//! │  │   │ Product │ │  Money  │ │ CartLine │ │ split  │ │ today's │  │   │
//! │  │   │  Order  │ │ TaxRate │ │ pricing  │ │ payment│ │  sales  │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                  settlement · validation · filter               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hearth-db (Record Store)                     │   │
//! │  │              memory, CSV files, or SQLite via sqlx              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (Product, Customer, Order, ...) and their enums
//! - [`money`] - Money in paise (i64), one rounding step for GST
//! - [`pricing`] - Counter / wholesale / custom price tiers
//! - [`filter`] - Catalog and customer search
//! - [`cart`] - The cart held by the POS page
//! - [`tender`] - Single and split payment collection
//! - [`settlement`] - Checkout request and the settlement plan
//! - [`metrics`] - Dashboard aggregations
//! - [`validation`] - Field rules for incoming payloads
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use hearth_core::money::Money;
//! use hearth_core::types::TaxRate;
//!
//! // 2 × 50.00 at 18% GST
//! let line = Money::from_minor(5000).multiply_quantity(2);
//! let gst = line.calculate_tax(TaxRate::DEFAULT_GST);
//!
//! assert_eq!(gst.to_string(), "18.00");
//! assert_eq!((line + gst).to_string(), "118.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod money;
pub mod pricing;
pub mod settlement;
pub mod tender;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on one cart line.
///
/// ## Business Reason
/// Catches a slipped finger (typing 1000 instead of 10) before it reaches
/// the stock counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Products at or below this stock level are flagged `low_stock`.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Default size of the popular-items and recent-orders lists.
pub const DEFAULT_LIST_LIMIT: usize = 10;
