//! Product, sales, and audit-log storage for the pricing agent.
//!
//! The engine talks to storage exclusively through the [`PricingStore`]
//! trait. Two implementations ship: an in-memory demo catalog seeded
//! with the reference products, and a Postgres-backed store.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use store::{PricingStore, StoreError};
