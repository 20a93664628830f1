//! Session-related types.
//!
//! Everything the shop keeps per visitor lives in the tower-sessions record:
//! the cart, pending flash messages, the admin flag and the id of the last
//! order this visitor placed.

use chrono::{DateTime, Utc};
use libra_core::{Cart, OrderId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// The visitor's cart, as `{"<product id>": quantity}`.
    pub const CART: &str = "cart";

    /// Flash messages waiting to be shown on the next page.
    pub const FLASH: &str = "flash";

    /// Present once the admin password has been verified.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Id of the order most recently placed from this session.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}

/// Session-stored admin login marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    /// When the password was verified.
    pub logged_in_at: DateTime<Utc>,
}

/// Visual weight of a flash message; doubles as its CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Load the visitor's cart. A missing or unreadable cart is empty.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable session cart");
            Ok(Cart::new())
        }
        Err(e) => Err(e),
    }
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Queue a flash message for the next page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Flash> = session.get(keys::FLASH).await?.unwrap_or_default();
    pending.push(Flash {
        level,
        message: message.into(),
    });
    session.insert(keys::FLASH, pending).await
}

/// Take every pending flash message, leaving none behind.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Flash>>(keys::FLASH)
        .await?
        .unwrap_or_default())
}

/// Mark the session as logged in to the admin console.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(
            keys::CURRENT_ADMIN,
            AdminSession {
                logged_in_at: Utc::now(),
            },
        )
        .await
}

/// Helper to clear the admin login (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AdminSession>(keys::CURRENT_ADMIN).await?;
    Ok(())
}

/// Remember the order just placed so the thank-you page may show it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_last_order(
    session: &Session,
    order_id: OrderId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::LAST_ORDER_ID, order_id).await
}

/// The order most recently placed from this session, if any.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn last_order(session: &Session) -> Result<Option<OrderId>, tower_sessions::session::Error> {
    session.get(keys::LAST_ORDER_ID).await
}
