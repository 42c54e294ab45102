//! # Seed Data
//!
//! Default catalog, staff accounts and customers for a fresh bakery store.
//! Backend-agnostic: everything goes through [`RecordStore`].

use tracing::{debug, info};

use hearth_core::{
    CustomerType, Money, NewCategory, NewCustomer, NewProduct, NewUser, TaxRate, UserRole,
};

use crate::error::StoreResult;
use crate::store::RecordStore;

const USERS: &[(&str, &str, UserRole)] = &[
    ("admin", "admin123", UserRole::Admin),
    ("cashier", "cashier123", UserRole::Cashier),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Cakes", "All types of cakes"),
    ("Pastries", "Fresh pastries and croissants"),
    ("Breads", "Freshly baked breads"),
    ("Sweets", "Traditional and modern sweets"),
    ("Beverages", "Hot and cold drinks"),
];

struct SeedProduct {
    name: &'static str,
    sku: &'static str,
    category: &'static str,
    counter: i64,
    wholesale: i64,
    stock: i64,
    unit: &'static str,
    gst_bps: u32,
    image: &'static str,
}

const UNSPLASH: &str = "https://images.unsplash.com/";

/// Prices in whole rupees.
const PRODUCTS: &[SeedProduct] = &[
    SeedProduct { name: "Chocolate Cake", sku: "CC001", category: "Cakes", counter: 120, wholesale: 100, stock: 25, unit: "piece", gst_bps: 1800, image: "photo-1578985545062-69928b1d9587" },
    SeedProduct { name: "Vanilla Cake", sku: "VC001", category: "Cakes", counter: 110, wholesale: 90, stock: 20, unit: "piece", gst_bps: 1800, image: "photo-1486427944299-d1955d23e34d" },
    SeedProduct { name: "Red Velvet Cake", sku: "RVC001", category: "Cakes", counter: 150, wholesale: 130, stock: 15, unit: "piece", gst_bps: 1800, image: "photo-1621303837174-89787a7d4729" },
    SeedProduct { name: "Butter Croissant", sku: "BC001", category: "Pastries", counter: 50, wholesale: 40, stock: 12, unit: "piece", gst_bps: 1800, image: "photo-1509440159596-0249088772ff" },
    SeedProduct { name: "Almond Croissant", sku: "AC001", category: "Pastries", counter: 60, wholesale: 50, stock: 10, unit: "piece", gst_bps: 1800, image: "photo-1555507036-ab794f1ec35d" },
    SeedProduct { name: "Glazed Donuts", sku: "GD001", category: "Sweets", counter: 40, wholesale: 35, stock: 30, unit: "piece", gst_bps: 1800, image: "photo-1551024506-0bccd828d307" },
    SeedProduct { name: "Whole Wheat Bread", sku: "WWB001", category: "Breads", counter: 40, wholesale: 32, stock: 8, unit: "loaf", gst_bps: 500, image: "photo-1549931319-a545dcf3bc73" },
    SeedProduct { name: "White Bread", sku: "WB001", category: "Breads", counter: 35, wholesale: 28, stock: 15, unit: "loaf", gst_bps: 500, image: "photo-1509440159596-0249088772ff" },
    SeedProduct { name: "Gulab Jamun", sku: "GJ001", category: "Sweets", counter: 80, wholesale: 70, stock: 5, unit: "kg", gst_bps: 1800, image: "photo-1601050690597-df0568f70950" },
    SeedProduct { name: "Rasgulla", sku: "RG001", category: "Sweets", counter: 90, wholesale: 80, stock: 3, unit: "kg", gst_bps: 1800, image: "photo-1609501676725-7186f681d32f" },
];

const CUSTOMERS: &[(&str, Option<&str>, Option<&str>, CustomerType)] = &[
    ("Walk-in Customer", None, None, CustomerType::WalkIn),
    ("Sarah Johnson", Some("9876543210"), Some("sarah@email.com"), CustomerType::Regular),
    ("Mike Chen", Some("9876543211"), Some("mike@email.com"), CustomerType::Wholesale),
    ("Emily Davis", Some("9876543212"), Some("emily@email.com"), CustomerType::Regular),
];

/// What [`seed_defaults`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == SeedReport::default()
    }
}

/// Inserts the default data unless the store already has users.
///
/// Products are linked to their category by name; barcodes run
/// `1234567890123..=1234567890132` in catalog order.
pub async fn seed_defaults(store: &dyn RecordStore) -> StoreResult<SeedReport> {
    if !store.list_users().await?.is_empty() {
        info!("Store already has users; skipping seed");
        return Ok(SeedReport::default());
    }

    let mut report = SeedReport::default();

    for (username, password, role) in USERS {
        store
            .create_user(NewUser {
                username: username.to_string(),
                password: password.to_string(),
                role: *role,
            })
            .await?;
        report.users += 1;
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = store
            .create_category(NewCategory {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        category_ids.push((*name, category.id));
        report.categories += 1;
    }

    for (index, seed) in PRODUCTS.iter().enumerate() {
        let category_id = category_ids
            .iter()
            .find(|(name, _)| *name == seed.category)
            .map(|(_, id)| *id);

        let product = store
            .create_product(NewProduct {
                name: seed.name.to_string(),
                sku: seed.sku.to_string(),
                category_id,
                category: seed.category.to_string(),
                counter_price: Money::from_major_minor(seed.counter, 0),
                wholesale_price: Money::from_major_minor(seed.wholesale, 0),
                custom_price: None,
                stock: seed.stock,
                unit: seed.unit.to_string(),
                gst_rate: TaxRate::from_bps(seed.gst_bps),
                image_url: Some(format!("{UNSPLASH}{}", seed.image)),
                barcode: Some(format!("{}", 1_234_567_890_123_i64 + index as i64)),
            })
            .await?;
        debug!(id = product.id, sku = %product.sku, "Seeded product");
        report.products += 1;
    }

    for (name, phone, email, customer_type) in CUSTOMERS {
        store
            .create_customer(NewCustomer {
                name: name.to_string(),
                phone: phone.map(str::to_string),
                email: email.map(str::to_string),
                address: None,
                gst_number: None,
                customer_type: *customer_type,
                balance: Money::zero(),
            })
            .await?;
        report.customers += 1;
    }

    info!(
        users = report.users,
        categories = report.categories,
        products = report.products,
        customers = report.customers,
        "Seeded default data"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use hearth_core::ProductStatus;

    #[tokio::test]
    async fn test_seed_populates_catalog() {
        let store = MemoryStore::new();
        let report = seed_defaults(&store).await.unwrap();

        assert_eq!(report.users, 2);
        assert_eq!(report.categories, 5);
        assert_eq!(report.products, 10);
        assert_eq!(report.customers, 4);

        let products = store.list_products().await.unwrap();
        let cake = &products[0];
        assert_eq!(cake.sku, "CC001");
        assert_eq!(cake.barcode.as_deref(), Some("1234567890123"));
        assert_eq!(cake.counter_price.to_string(), "120.00");
        assert_eq!(cake.status, ProductStatus::Active);

        let rasgulla = &products[9];
        assert_eq!(rasgulla.barcode.as_deref(), Some("1234567890132"));
        assert_eq!(rasgulla.status, ProductStatus::LowStock);

        let bread = products.iter().find(|p| p.sku == "WWB001").unwrap();
        assert_eq!(bread.gst_rate, TaxRate::from_bps(500));
        let breads = store.list_categories().await.unwrap();
        assert_eq!(
            bread.category_id,
            breads.iter().find(|c| c.name == "Breads").map(|c| c.id)
        );
    }

    #[tokio::test]
    async fn test_seed_is_skipped_when_users_exist() {
        let store = MemoryStore::new();
        seed_defaults(&store).await.unwrap();

        let again = seed_defaults(&store).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(store.list_products().await.unwrap().len(), 10);
    }
}
