//! Storage contracts for orders and contact messages.
//!
//! The storefront crate implements these on top of `PostgreSQL`; tests use
//! in-memory fakes.

use std::future::Future;

use crate::contact::NewContactMessage;
use crate::order::{NewOrder, OrderSummary, OrderWithItems};
use crate::types::{ContactMessageId, OrderId};

/// A storage backend failure.
#[derive(Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StoreError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>);

impl StoreError {
    /// Wrap a backend error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

/// Order persistence.
pub trait OrderStore: Sync {
    /// Write the order header and all of its items atomically.
    ///
    /// Either every row is written or none is.
    fn create_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<OrderId, StoreError>> + Send;

    /// Overwrite an order's status. Returns `false` if no such order exists.
    fn update_status(
        &self,
        id: OrderId,
        status: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Orders newest first, optionally limited to one status, each with a
    /// one-line summary of its items.
    fn list_orders(
        &self,
        status: Option<&str>,
    ) -> impl Future<Output = Result<Vec<OrderSummary>, StoreError>> + Send;

    /// A single order with its items.
    fn find_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<OrderWithItems>, StoreError>> + Send;
}

/// Contact message persistence.
pub trait MessageStore: Sync {
    /// Store a contact message.
    fn create_message(
        &self,
        message: &NewContactMessage,
    ) -> impl Future<Output = Result<ContactMessageId, StoreError>> + Send;
}
