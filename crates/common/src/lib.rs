//! Shared domain types for the storefront pricing agent.

pub mod types;

pub use types::*;
