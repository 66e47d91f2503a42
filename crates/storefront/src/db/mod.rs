//! In-memory repositories for storefront data.
//!
//! The storefront runs on mock data: products are seeded at start-up (or
//! loaded from a JSON catalog file), accounts come from the demo credential
//! table, and orders live for the lifetime of the process.
//!
//! ## Repositories
//!
//! - [`products::ProductRepository`] - Catalog and stock
//! - [`accounts::AccountRepository`] - Users, password hashes, address books
//! - [`orders::OrderRepository`] - Placed orders
//!
//! Each repository guards its table with a `tokio::sync::RwLock`; handlers
//! share them through `AppState`.

pub mod accounts;
pub mod orders;
pub mod products;
pub mod seed;

use thiserror::Error;

use afrovibz_core::ProductId;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Input failed field validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Product is missing or no longer on sale.
    #[error("product {0} is not available")]
    Unavailable(ProductId),

    /// Not enough units to satisfy a reservation.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Seed data could not be loaded.
    #[error("failed to load seed data: {0}")]
    Seed(String),
}
