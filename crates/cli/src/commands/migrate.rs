//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! libra-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded into
//! the binary at compile time.

use libra_storefront::db;

use super::{CommandError, database_url};

/// Run every pending storefront migration.
///
/// # Errors
///
/// Returns `CommandError` if the URL is missing, the database is
/// unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
