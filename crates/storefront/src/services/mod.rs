//! Services for the storefront.
//!
//! - `auth` - Admin password verification (Argon2id)
//! - `email` - SMTP delivery and notification templates
//! - `notifications` - Channel hand-off and background delivery worker

pub mod auth;
pub mod email;
pub mod notifications;

pub use auth::{AdminAuthService, AuthError};
pub use email::{EmailError, EmailService};
pub use notifications::NotificationQueue;
