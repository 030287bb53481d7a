//! Postgres-backed store.
//!
//! Schema mirrors the reference deployment: `products`, `sales`, and
//! `agent_logs`. Batch applies run in a single transaction so a failed
//! batch leaves both prices and the audit table untouched.

use async_trait::async_trait;
use rand::Rng;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::warn;

use common::{round2, AuditLogEntry, Decision, PricingAction, Product};

use crate::memory::demo_products;
use crate::store::{PricingStore, StoreError};

/// Sales window consulted for the authoritative trend, in days.
const SALES_WINDOW_DAYS: i32 = 7;

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Connect, create the schema if needed, and seed the demo products
    /// into an empty catalog.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let catalog = Self { pool };
        catalog.ensure_schema().await?;
        Ok(catalog)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS products (
                id BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                price DOUBLE PRECISION NOT NULL,
                stock BIGINT NOT NULL,
                category TEXT NOT NULL DEFAULT 'General'
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS sales (
                id BIGSERIAL PRIMARY KEY,
                product_id BIGINT NOT NULL,
                quantity BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS agent_logs (
                id BIGSERIAL PRIMARY KEY,
                product_id BIGINT NOT NULL,
                problem TEXT NOT NULL DEFAULT '',
                action TEXT NOT NULL,
                action_value DOUBLE PRECISION NOT NULL DEFAULT 0,
                reason TEXT NOT NULL DEFAULT '',
                before_price DOUBLE PRECISION NOT NULL,
                after_price DOUBLE PRECISION NOT NULL,
                success BOOLEAN NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"#,
        )
        .execute(&self.pool)
        .await?;

        for product in demo_products() {
            sqlx::query(
                "INSERT INTO products (id, name, price, stock, category)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.category)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
        Ok(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            category: row.try_get("category")?,
        })
    }

    fn entry_from_row(row: &PgRow) -> Result<AuditLogEntry, StoreError> {
        let product_id: i64 = row.try_get("product_id")?;
        let action_raw: String = row.try_get("action")?;
        let action = action_raw.parse::<PricingAction>().unwrap_or_else(|e| {
            warn!("audit row for product {product_id}: {e}; treating as no_action");
            PricingAction::NoAction
        });
        let name: String = row.try_get("name")?;
        let name = if name.is_empty() {
            format!("Product {product_id}")
        } else {
            name
        };

        Ok(AuditLogEntry {
            decision: Decision {
                product_id,
                name,
                problem: row.try_get("problem")?,
                action,
                magnitude: row.try_get("action_value")?,
                reason: row.try_get("reason")?,
                before_price: row.try_get("before_price")?,
                after_price: row.try_get("after_price")?,
                success: row.try_get("success")?,
            },
            applied_at: row.try_get("applied_at")?,
        })
    }

    async fn insert_log_row<'e, E>(executor: E, entry: &AuditLogEntry) -> Result<(), StoreError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let d = &entry.decision;
        sqlx::query(
            "INSERT INTO agent_logs
             (product_id, problem, action, action_value, reason, before_price, after_price, success, applied_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(d.product_id)
        .bind(&d.problem)
        .bind(d.action.as_str())
        .bind(d.magnitude)
        .bind(&d.reason)
        .bind(d.before_price)
        .bind(d.after_price)
        .bind(d.success)
        .bind(entry.applied_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PricingStore for PgCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name, price, stock, category FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::product_from_row).collect()
    }

    async fn update_price(&self, product_id: i64, price: f64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET price = $1 WHERE id = $2")
            .bind(round2(price))
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound(product_id));
        }
        Ok(())
    }

    async fn sum_quantity(&self, product_id: i64) -> Result<i64, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT AS total
             FROM sales
             WHERE product_id = $1
               AND created_at > now() - make_interval(days => $2)",
        )
        .bind(product_id)
        .bind(SALES_WINDOW_DAYS)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("total")?)
    }

    async fn record_purchase(&self, product_id: i64, quantity: i64) -> Result<Product, StoreError> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE products SET stock = stock - $2
             WHERE id = $1 AND stock >= $2
             RETURNING id, name, price, stock, category",
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let product = match updated {
            Some(row) => Self::product_from_row(&row)?,
            None => {
                let existing = sqlx::query("SELECT stock FROM products WHERE id = $1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                return match existing {
                    Some(row) => Err(StoreError::InsufficientStock {
                        requested: quantity,
                        available: row.try_get("stock")?,
                    }),
                    None => Err(StoreError::ProductNotFound(product_id)),
                };
            }
        };

        sqlx::query("INSERT INTO sales (product_id, quantity) VALUES ($1, $2)")
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(product)
    }

    async fn simulate_sales(&self) -> Result<(), StoreError> {
        let rows = sqlx::query("SELECT id FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<i64> = rows
            .iter()
            .map(|row| row.try_get("id"))
            .collect::<Result<_, sqlx::Error>>()?;

        // Draw all quantities up front; the RNG must not live across awaits.
        let quantities: Vec<i64> = {
            let mut rng = rand::thread_rng();
            ids.iter().map(|_| rng.gen_range(1..=5)).collect()
        };

        let mut tx = self.pool.begin().await?;
        for (id, quantity) in ids.iter().zip(quantities) {
            sqlx::query("INSERT INTO sales (product_id, quantity) VALUES ($1, $2)")
                .bind(id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn apply_price_changes(&self, entries: &[AuditLogEntry]) -> Result<(), StoreError> {
        // All-or-nothing: a failure mid-batch rolls the whole batch back.
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            let d = &entry.decision;
            if d.success {
                sqlx::query("UPDATE products SET price = $1 WHERE id = $2")
                    .bind(d.after_price)
                    .bind(d.product_id)
                    .execute(&mut *tx)
                    .await?;
            }
            Self::insert_log_row(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_log(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        Self::insert_log_row(&self.pool, entry).await
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT l.product_id, l.problem, l.action, l.action_value, l.reason,
                    l.before_price, l.after_price, l.success, l.applied_at,
                    COALESCE(p.name, '') AS name
             FROM agent_logs l
             LEFT JOIN products p ON p.id = l.product_id
             ORDER BY l.id DESC
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::entry_from_row).collect()
    }
}
