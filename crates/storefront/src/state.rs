//! Application state shared across handlers.

use std::sync::Arc;

use libra_core::OrderWorkflow;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{MessageRepository, OrderRepository, ProductRepository};
use crate::services::{AdminAuthService, NotificationQueue};

/// The workflow type handlers use, backed by `PostgreSQL` and the mail queue.
pub type ShopWorkflow<'a> =
    OrderWorkflow<'a, ProductRepository, OrderRepository, MessageRepository, NotificationQueue>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    products: ProductRepository,
    orders: OrderRepository,
    messages: MessageRepository,
    admin_auth: AdminAuthService,
    notifications: NotificationQueue,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `notifications` - Queue feeding the notification worker
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, notifications: NotificationQueue) -> Self {
        let admin_auth = AdminAuthService::new(config.admin_password_hash.clone());

        Self {
            inner: Arc::new(AppStateInner {
                products: ProductRepository::new(pool.clone()),
                orders: OrderRepository::new(pool.clone()),
                messages: MessageRepository::new(pool.clone()),
                config,
                pool,
                admin_auth,
                notifications,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the admin password verifier.
    #[must_use]
    pub fn admin_auth(&self) -> &AdminAuthService {
        &self.inner.admin_auth
    }

    /// Catalog reads.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Checkout, contact and order administration over this state's
    /// repositories.
    #[must_use]
    pub fn workflow(&self) -> ShopWorkflow<'_> {
        OrderWorkflow::new(
            &self.inner.products,
            &self.inner.orders,
            &self.inner.messages,
            &self.inner.notifications,
            self.inner.config.missing_products,
        )
    }
}
