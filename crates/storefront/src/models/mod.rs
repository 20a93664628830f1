//! Storefront-only models.
//!
//! Domain records live in `libra-core`; this module holds what only the web
//! layer needs.

pub mod session;

pub use session::{AdminSession, Flash, FlashLevel, keys as session_keys};
