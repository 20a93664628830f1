//! Admin authentication extractors.
//!
//! The order console has no user accounts: a session either carries the
//! admin marker set at login or it does not.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{AdminSession, session_keys};

/// Path of the admin login form.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires an admin session.
///
/// If the visitor has not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Logged in since {}", admin.logged_in_at)
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

/// Error returned when the admin console is requested without a login.
#[derive(Debug)]
pub enum AdminRejection {
    /// Redirect to the login form.
    RedirectToLogin,
    /// The session layer is missing or the store failed.
    SessionUnavailable,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(ADMIN_LOGIN_PATH).into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection::SessionUnavailable)?;

        let admin = session
            .get::<AdminSession>(session_keys::CURRENT_ADMIN)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read admin session");
                AdminRejection::SessionUnavailable
            })?
            .ok_or(AdminRejection::RedirectToLogin)?;

        Ok(Self(admin))
    }
}
