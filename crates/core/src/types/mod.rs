//! Core value types for the store.
//!
//! Type-safe wrappers for ids, prices, email addresses and order statuses.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::{OrderStatus, UnknownOrderStatus};
