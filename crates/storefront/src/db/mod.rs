//! Database operations for the shop's `PostgreSQL` database.
//!
//! ## Tables (schema `shop`)
//!
//! - `products` - Textbook catalog, written only by `libra-cli seed`
//! - `orders` - Order headers
//! - `order_items` - Order lines with price and title snapshots
//! - `messages` - Contact form submissions
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p libra-cli -- migrate
//! ```

use std::time::Duration;

use libra_core::StoreError;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod messages;
pub mod orders;
pub mod products;

pub use messages::MessageRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        Self::new(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Convert a domain quantity into the `INTEGER` column type.
fn quantity_to_db(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("quantity {quantity} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_conversions() {
        assert!(matches!(quantity_to_db(3), Ok(3)));
        assert!(matches!(
            quantity_to_db(u32::MAX),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
