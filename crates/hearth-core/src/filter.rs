//! # Catalog and Customer Filters
//!
//! Matching rules shared by every record store backend, so a search for
//! "cake" returns the same rows from memory, CSV or SQLite.

use serde::{Deserialize, Serialize};

use crate::types::{Customer, Product};

/// Category name that disables the category filter.
pub const ALL_CATEGORIES: &str = "All";

/// Query parameters of `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact category name. `"All"` or empty means no filter.
    pub category: Option<String>,
    /// Case-insensitive substring over name, SKU and category.
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn category(name: impl Into<String>) -> Self {
        ProductFilter {
            category: Some(name.into()),
            search: None,
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        ProductFilter {
            category: None,
            search: Some(query.into()),
        }
    }

    /// True when `product` passes both filters.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(category) => product.category == category,
        };

        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let query = query.to_lowercase();
                product.name.to_lowercase().contains(&query)
                    || product.sku.to_lowercase().contains(&query)
                    || product.category.to_lowercase().contains(&query)
            }
        };

        category_ok && search_ok
    }

    /// Applies the filter, keeping the input order.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Customer search: name and email case-insensitively, phone as a raw
/// substring. An empty query matches everyone.
pub fn customer_matches(customer: &Customer, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let lowered = query.to_lowercase();
    customer.name.to_lowercase().contains(&lowered)
        || customer
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(&lowered))
        || customer
            .phone
            .as_deref()
            .is_some_and(|phone| phone.contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{CustomerType, NewCustomer, NewProduct, TaxRate};
    use chrono::Utc;

    fn product(id: i64, name: &str, sku: &str, category: &str) -> Product {
        NewProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            category_id: None,
            category: category.to_string(),
            counter_price: Money::from_minor(1000),
            wholesale_price: Money::from_minor(900),
            custom_price: None,
            stock: 20,
            unit: "piece".to_string(),
            gst_rate: TaxRate::DEFAULT_GST,
            image_url: None,
            barcode: None,
        }
        .into_product(id, Utc::now())
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Chocolate Cake", "CC001", "Cakes"),
            product(2, "Butter Croissant", "BC001", "Pastries"),
            product(3, "White Bread", "WB001", "Breads"),
        ]
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        assert_eq!(ProductFilter::default().apply(catalog()).len(), 3);
    }

    #[test]
    fn test_category_is_exact() {
        let hits = ProductFilter::category("Cakes").apply(catalog());
        assert_eq!(hits.len(), 1);
        assert!(ProductFilter::category("cakes").apply(catalog()).is_empty());
        assert_eq!(ProductFilter::category("All").apply(catalog()).len(), 3);
    }

    #[test]
    fn test_search_covers_name_sku_category() {
        assert_eq!(ProductFilter::search("CROISS").apply(catalog())[0].id, 2);
        assert_eq!(ProductFilter::search("wb0").apply(catalog())[0].id, 3);
        assert_eq!(ProductFilter::search("cake").apply(catalog())[0].id, 1);
        assert!(ProductFilter::search("muffin").apply(catalog()).is_empty());
    }

    #[test]
    fn test_filters_combine() {
        let filter = ProductFilter {
            category: Some("Breads".to_string()),
            search: Some("cake".to_string()),
        };
        assert!(filter.apply(catalog()).is_empty());
    }

    #[test]
    fn test_customer_search() {
        let sarah = NewCustomer {
            name: "Sarah Johnson".to_string(),
            phone: Some("9876543210".to_string()),
            email: Some("Sarah@Email.com".to_string()),
            address: None,
            gst_number: None,
            customer_type: CustomerType::Regular,
            balance: Money::zero(),
        }
        .into_customer(2, Utc::now());

        assert!(customer_matches(&sarah, "sarah"));
        assert!(customer_matches(&sarah, "email.COM"));
        assert!(customer_matches(&sarah, "543"));
        assert!(customer_matches(&sarah, ""));
        assert!(!customer_matches(&sarah, "mike"));
    }
}
