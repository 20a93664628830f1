//! Admin authentication.
//!
//! The order console is guarded by one shared password. Only its Argon2id
//! hash is configured (`ADMIN_PASSWORD_HASH`); the plaintext never appears in
//! configuration or logs.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

/// Minimum admin password length accepted by [`hash_password`].
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Verifies login attempts against the configured admin hash.
#[derive(Clone)]
pub struct AdminAuthService {
    password_hash: SecretString,
}

impl AdminAuthService {
    /// Create a service for the given PHC hash string.
    #[must_use]
    pub const fn new(password_hash: SecretString) -> Self {
        Self { password_hash }
    }

    /// Check a submitted password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the password does not match.
    pub fn authenticate(&self, password: &str) -> Result<(), AuthError> {
        verify_password(password, self.password_hash.expose_secret())
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is shorter than
/// [`MIN_PASSWORD_LENGTH`], or `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
