//! Libra Shkollore core: shared types and the shop's domain logic.
//!
//! Used by:
//! - `storefront` - the public shop and its admin console
//! - `cli` - migrations, catalog seeding and password hashing
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no database
//! access, no HTTP, no mail transport. Storage and notification are traits
//! ([`CatalogStore`], [`OrderStore`], [`MessageStore`], [`Notifier`]) that the
//! storefront implements.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails and order statuses
//! - [`cart`] - The session-held shopping cart as a plain value
//! - [`catalog`] - Products and the read-only catalog contract
//! - [`order`] - Checkout input and order records
//! - [`contact`] - Contact form messages
//! - [`notification`] - Operator notifications
//! - [`store`] - Order and message persistence contracts
//! - [`workflow`] - Checkout, contact submission and order administration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod notification;
pub mod order;
pub mod store;
pub mod types;
pub mod workflow;

pub use cart::{Cart, ResolvedCartLine};
pub use catalog::{CatalogFilter, CatalogStore, PriceLookup, Product, ProductSnapshot};
pub use contact::{ContactForm, NewContactMessage};
pub use notification::{Notification, NotificationError, Notifier};
pub use order::{
    CheckoutForm, CustomerInfo, NewOrder, NewOrderItem, Order, OrderItem, OrderSummary,
    OrderWithItems, ValidationError,
};
pub use store::{MessageStore, OrderStore, StoreError};
pub use types::*;
pub use workflow::{CheckoutError, ContactError, MissingProductPolicy, OrderWorkflow};
