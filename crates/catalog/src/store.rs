use async_trait::async_trait;

use common::{AuditLogEntry, Product};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("invalid quantity {0}: must be positive")]
    InvalidQuantity(i64),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("sales history unavailable: {0}")]
    HistoryUnavailable(String),

    #[error("audit log unavailable: {0}")]
    LogUnavailable(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Storage boundary consumed by the decision workflow.
///
/// `sum_quantity` and `recent_logs` are allowed to fail where a backend
/// has no such data — callers fall back explicitly (to the synthetic
/// demand formula and the in-memory audit ring respectively).
#[async_trait]
pub trait PricingStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Write a new unit price for one product.
    async fn update_price(&self, product_id: i64, price: f64) -> Result<(), StoreError>;

    /// Total quantity sold over the recent window.
    async fn sum_quantity(&self, product_id: i64) -> Result<i64, StoreError>;

    /// Decrement stock and record a sale. Returns the updated product.
    async fn record_purchase(&self, product_id: i64, quantity: i64) -> Result<Product, StoreError>;

    /// Randomized demo stimulus so signals keep moving.
    async fn simulate_sales(&self) -> Result<(), StoreError>;

    /// Commit one batch of applied decisions: price writes plus audit
    /// rows, transactional where the backend supports it.
    async fn apply_price_changes(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError>;

    /// Record a single audit entry (immediate-variant path).
    async fn insert_log(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Most recent audit entries, newest first.
    async fn recent_logs(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError>;
}
