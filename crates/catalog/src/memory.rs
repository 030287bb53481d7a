//! In-memory demo catalog.
//!
//! Seeded with the reference product set. Keeps no sales history and no
//! durable audit log — those lookups fail, which pushes callers onto
//! their explicit fallback paths, matching how the demo deployment
//! behaves without a database.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use common::{round2, AuditLogEntry, Product};

use crate::store::{PricingStore, StoreError};

/// The demo product set.
pub fn demo_products() -> Vec<Product> {
    fn p(id: i64, name: &str, price: f64, stock: i64, category: &str) -> Product {
        Product {
            id,
            name: name.into(),
            price,
            stock,
            category: category.into(),
        }
    }

    vec![
        p(1, "Stainless Steel Water Bottle", 699.0, 44, "Kitchen"),
        p(2, "Wireless Gaming Mouse", 1499.0, 26, "Gaming"),
        p(3, "Portable Power Bank", 1299.0, 38, "Accessories"),
        p(4, "LED Desk Lamp", 899.0, 19, "Home"),
        p(5, "Wireless Bluetooth Headphones", 2499.0, 21, "Audio"),
        p(6, "Smart Fitness Watch", 3299.0, 14, "Wearables"),
        p(7, "Running Shoes", 2799.0, 32, "Fashion"),
        p(8, "Men's Casual T-Shirt", 799.0, 55, "Fashion"),
        p(9, "Kitchen Mixer Grinder", 3699.0, 12, "Appliances"),
    ]
}

pub struct MemoryCatalog {
    products: Mutex<Vec<Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::with_products(demo_products())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PricingStore for MemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.lock().clone())
    }

    async fn update_price(&self, product_id: i64, price: f64) -> Result<(), StoreError> {
        let mut products = self.products.lock();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;
        product.price = round2(price);
        Ok(())
    }

    async fn sum_quantity(&self, _product_id: i64) -> Result<i64, StoreError> {
        Err(StoreError::HistoryUnavailable(
            "demo catalog keeps no sales history".into(),
        ))
    }

    async fn record_purchase(&self, product_id: i64, quantity: i64) -> Result<Product, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        let mut products = self.products.lock();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;

        if quantity > product.stock {
            return Err(StoreError::InsufficientStock {
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(product.clone())
    }

    async fn simulate_sales(&self) -> Result<(), StoreError> {
        let mut products = self.products.lock();
        let mut rng = rand::thread_rng();
        for product in products.iter_mut() {
            let swing: i64 = rng.gen_range(-2..=4);
            product.stock = (product.stock - swing.max(0)).max(1);
        }
        Ok(())
    }

    async fn apply_price_changes(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError> {
        // Single-threaded in-memory mutation: no partial-failure path.
        let mut products = self.products.lock();
        for entry in entries {
            if !entry.decision.success {
                continue;
            }
            if let Some(product) = products
                .iter_mut()
                .find(|p| p.id == entry.decision.product_id)
            {
                product.price = round2(entry.decision.after_price);
            }
        }
        Ok(())
    }

    async fn insert_log(&self, _entry: &AuditLogEntry) -> Result<(), StoreError> {
        // No durable log; the workflow's in-memory ring is the record.
        Ok(())
    }

    async fn recent_logs(&self, _limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        Err(StoreError::LogUnavailable(
            "demo catalog keeps no durable audit log".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Decision, PricingAction};

    fn entry(product_id: i64, after_price: f64, success: bool) -> AuditLogEntry {
        AuditLogEntry::new(Decision {
            product_id,
            name: format!("Product {product_id}"),
            problem: String::new(),
            action: PricingAction::DecreasePrice,
            magnitude: 5.0,
            reason: String::new(),
            before_price: 100.0,
            after_price,
            success,
        })
    }

    #[tokio::test]
    async fn seeds_the_demo_catalog() {
        let store = MemoryCatalog::new();
        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 9);
        assert_eq!(products[2].id, 3);
        assert_eq!(products[2].price, 1299.0);
    }

    #[tokio::test]
    async fn update_price_rejects_unknown_product() {
        let store = MemoryCatalog::new();
        assert!(matches!(
            store.update_price(999, 10.0).await,
            Err(StoreError::ProductNotFound(999))
        ));
    }

    #[tokio::test]
    async fn purchase_validates_quantity_and_stock() {
        let store = MemoryCatalog::new();

        assert!(matches!(
            store.record_purchase(1, 0).await,
            Err(StoreError::InvalidQuantity(0))
        ));
        assert!(matches!(
            store.record_purchase(1, -3).await,
            Err(StoreError::InvalidQuantity(-3))
        ));
        assert!(matches!(
            store.record_purchase(999, 1).await,
            Err(StoreError::ProductNotFound(999))
        ));
        assert!(matches!(
            store.record_purchase(9, 100_000).await,
            Err(StoreError::InsufficientStock { .. })
        ));

        let updated = store.record_purchase(1, 4).await.unwrap();
        assert_eq!(updated.stock, 40);
    }

    #[tokio::test]
    async fn sales_history_is_unavailable() {
        let store = MemoryCatalog::new();
        assert!(matches!(
            store.sum_quantity(1).await,
            Err(StoreError::HistoryUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn simulate_sales_never_zeroes_stock() {
        let store = MemoryCatalog::with_products(vec![Product {
            id: 1,
            name: "Nearly Gone".into(),
            price: 10.0,
            stock: 1,
            category: "General".into(),
        }]);
        for _ in 0..20 {
            store.simulate_sales().await.unwrap();
        }
        let products = store.list_products().await.unwrap();
        assert!(products[0].stock >= 1);
    }

    #[tokio::test]
    async fn apply_writes_only_successful_entries() {
        let store = MemoryCatalog::new();
        let entries = vec![entry(1, 629.10, true), entry(2, 1349.10, false)];
        store.apply_price_changes(&entries).await.unwrap();

        let products = store.list_products().await.unwrap();
        assert_eq!(products[0].price, 629.10);
        assert_eq!(products[1].price, 1499.0);
    }

    #[tokio::test]
    async fn apply_skips_unknown_products() {
        let store = MemoryCatalog::new();
        let entries = vec![entry(999, 1.0, true)];
        assert!(store.apply_price_changes(&entries).await.is_ok());
    }
}
