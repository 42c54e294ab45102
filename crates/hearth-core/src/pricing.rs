//! # Price Resolution
//!
//! One product, three price tiers. The cart resolves the tier once, when the
//! line is added, and the settled order keeps that snapshot.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price_type      │  unit price                                          │
//! │  ─────────────── │  ─────────────────────────────────────────────────── │
//! │  wholesale       │  wholesale_price                                     │
//! │  custom          │  custom_price, or counter_price when none is set     │
//! │  counter / other │  counter_price                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The browser uses the same rule for optimistic display, so the two must
//! agree byte for byte; keep this function free of any other input.

use crate::money::Money;
use crate::types::{PriceType, Product};

/// Unit price of `product` under `price_type`.
///
/// ## Example
/// ```rust,ignore
/// let price = resolve_price(&croissant, PriceType::Wholesale);
/// assert_eq!(price, croissant.wholesale_price);
/// ```
pub fn resolve_price(product: &Product, price_type: PriceType) -> Money {
    match price_type {
        PriceType::Wholesale => product.wholesale_price,
        PriceType::Custom => product.custom_price.unwrap_or(product.counter_price),
        PriceType::Counter => product.counter_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewProduct, TaxRate};
    use chrono::Utc;

    fn cake(custom: Option<i64>) -> Product {
        NewProduct {
            name: "Chocolate Cake".to_string(),
            sku: "CC001".to_string(),
            category_id: None,
            category: "Cakes".to_string(),
            counter_price: Money::from_minor(12000),
            wholesale_price: Money::from_minor(10000),
            custom_price: custom.map(Money::from_minor),
            stock: 25,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
        .into_product(1, Utc::now())
    }

    #[test]
    fn test_tiers() {
        let p = cake(Some(11000));
        assert_eq!(resolve_price(&p, PriceType::Counter).minor(), 12000);
        assert_eq!(resolve_price(&p, PriceType::Wholesale).minor(), 10000);
        assert_eq!(resolve_price(&p, PriceType::Custom).minor(), 11000);
    }

    #[test]
    fn test_custom_falls_back_to_counter() {
        let p = cake(None);
        assert_eq!(resolve_price(&p, PriceType::Custom).minor(), 12000);
    }

    #[test]
    fn test_unknown_tag_prices_as_counter() {
        let p = cake(Some(11000));
        assert_eq!(
            resolve_price(&p, PriceType::parse("retail")),
            resolve_price(&p, PriceType::Counter)
        );
    }

    #[test]
    fn test_is_pure() {
        let p = cake(Some(11000));
        for tier in [PriceType::Counter, PriceType::Wholesale, PriceType::Custom] {
            assert_eq!(resolve_price(&p, tier), resolve_price(&p, tier));
        }
    }
}
