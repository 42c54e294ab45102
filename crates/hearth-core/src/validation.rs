//! # Validation Module
//!
//! Input validation for Hearth POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser (TypeScript)                                         │
//! │  └── Basic form checks, immediate feedback                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum extractors                                              │
//! │  └── JSON shape and types (serde)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  └── Business rules, run before anything is persisted                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Record store                                                 │
//! │  └── Uniqueness (SKU, username), existence of referenced rows          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    CustomerPatch, NewCategory, NewCustomer, NewProduct, NewUser, ProductPatch, TaxRate,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Only letters, digits, hyphens, underscores
///
/// ## Example
/// ```rust
/// use hearth_core::validation::validate_sku;
///
/// assert!(validate_sku("CC001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a search query and returns it trimmed.
///
/// ## Rules
/// - Can be empty (no filter)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Loose email shape check: something before and after a single `@`.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## User Workflow
/// ```text
/// Cashier types quantity 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → "quantity must be positive"
///      ├── qty > 999? → "quantity must be between 1 and 999"
///      └── OK → line added
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

fn within_max_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount > Money::MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Money::MAX_AMOUNT.major(),
        });
    }

    Ok(())
}

/// Prices may be zero (free samples) but never negative, and never above
/// [`Money::MAX_AMOUNT`].
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    within_max_amount(field, price)
}

/// Payments must move money: strictly positive, at most [`Money::MAX_AMOUNT`].
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    within_max_amount("amount", amount)
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// GST rates run from 0% to 100%.
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() > TaxRate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "gstRate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of distinct lines in a cart.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_sku(&product.sku)?;
    required("category", &product.category, 100)?;
    required("unit", &product.unit, 20)?;
    validate_price("counterPrice", product.counter_price)?;
    validate_price("wholesalePrice", product.wholesale_price)?;
    if let Some(custom) = product.custom_price {
        validate_price("customPrice", custom)?;
    }
    validate_stock(product.stock)?;
    validate_tax_rate(product.gst_rate)?;
    optional("barcode", product.barcode.as_deref(), 50)?;
    Ok(())
}

pub fn validate_product_patch(patch: &ProductPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_product_name(name)?;
    }
    if let Some(sku) = &patch.sku {
        validate_sku(sku)?;
    }
    if let Some(category) = &patch.category {
        required("category", category, 100)?;
    }
    if let Some(unit) = &patch.unit {
        required("unit", unit, 20)?;
    }
    if let Some(price) = patch.counter_price {
        validate_price("counterPrice", price)?;
    }
    if let Some(price) = patch.wholesale_price {
        validate_price("wholesalePrice", price)?;
    }
    if let Some(Some(price)) = patch.custom_price {
        validate_price("customPrice", price)?;
    }
    if let Some(stock) = patch.stock {
        validate_stock(stock)?;
    }
    if let Some(rate) = patch.gst_rate {
        validate_tax_rate(rate)?;
    }
    Ok(())
}

pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_customer_name(&customer.name)?;
    optional("phone", customer.phone.as_deref(), 20)?;
    validate_email(customer.email.as_deref())?;
    optional("gstNumber", customer.gst_number.as_deref(), 20)?;
    Ok(())
}

pub fn validate_customer_patch(patch: &CustomerPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_customer_name(name)?;
    }
    if let Some(phone) = &patch.phone {
        optional("phone", phone.as_deref(), 20)?;
    }
    if let Some(email) = &patch.email {
        validate_email(email.as_deref())?;
    }
    if let Some(gst_number) = &patch.gst_number {
        optional("gstNumber", gst_number.as_deref(), 20)?;
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    required("username", &user.username, 50)?;
    required("password", &user.password, 200)?;
    Ok(())
}

pub fn validate_new_category(category: &NewCategory) -> ValidationResult<()> {
    required("name", &category.name, 100)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerType;

    fn croissant() -> NewProduct {
        NewProduct {
            name: "Butter Croissant".to_string(),
            sku: "BC001".to_string(),
            category_id: None,
            category: "Pastries".to_string(),
            counter_price: Money::from_minor(5000),
            wholesale_price: Money::from_minor(4000),
            custom_price: None,
            stock: 12,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: Some("1234567890126".to_string()),
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("CC001").is_ok());
        assert!(validate_sku("cake-1_a").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_minor(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_minor(-100)).is_err());

        assert!(validate_payment_amount(Money::MAX_AMOUNT).is_ok());
        let err = validate_payment_amount(Money::from_minor(Money::MAX_AMOUNT.minor() + 1)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { max: 1_000_000_000, .. }));
    }

    #[test]
    fn test_price_upper_bound() {
        assert!(validate_price("counterPrice", Money::MAX_AMOUNT).is_ok());

        let huge: Money = "50000000000000000".parse().unwrap();
        let err = validate_price("counterPrice", huge).unwrap_err();
        assert_eq!(err.field(), "counterPrice");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(None).is_ok());
        assert!(validate_email(Some("")).is_ok());
        assert!(validate_email(Some("mike@email.com")).is_ok());
        assert!(validate_email(Some("mike.email.com")).is_err());
        assert!(validate_email(Some("@email.com")).is_err());
    }

    #[test]
    fn test_new_product_rules() {
        assert!(validate_new_product(&croissant()).is_ok());

        let mut bad = croissant();
        bad.counter_price = Money::from_minor(-1);
        let err = validate_new_product(&bad).unwrap_err();
        assert_eq!(err.field(), "counterPrice");

        let mut bad = croissant();
        bad.name = "  ".to_string();
        assert_eq!(validate_new_product(&bad).unwrap_err().field(), "name");

        let mut bad = croissant();
        bad.stock = -3;
        assert_eq!(validate_new_product(&bad).unwrap_err().field(), "stock");
    }

    #[test]
    fn test_patch_rules() {
        let patch = ProductPatch {
            sku: Some("bad sku".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_product_patch(&patch).unwrap_err().field(), "sku");
        assert!(validate_product_patch(&ProductPatch::default()).is_ok());
    }

    #[test]
    fn test_new_customer_rules() {
        let customer = NewCustomer {
            name: "".to_string(),
            phone: None,
            email: None,
            address: None,
            gst_number: None,
            customer_type: CustomerType::Regular,
            balance: Money::zero(),
        };
        assert_eq!(validate_new_customer(&customer).unwrap_err().field(), "name");
    }
}
