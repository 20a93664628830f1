//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong admin password, or an unusable stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak to be hashed as the admin secret.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
