//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (featured books, grade links)
//! GET  /shop?grade=&q=            - Catalog search
//! GET  /health                    - Liveness
//! GET  /health/ready              - Database readiness
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add a book, back to the referring page
//! POST /cart/update               - Replace quantities from qty_<id> fields
//!
//! # Checkout
//! GET  /checkout                  - Delivery form
//! POST /checkout                  - Place the order
//! GET  /thank-you?order_id=       - Confirmation
//!
//! # Contact
//! GET  /contact                   - Contact form
//! POST /contact                   - Send a message
//!
//! # Admin
//! GET  /admin/login               - Password form
//! POST /admin/session             - Log in (rate limited)
//! POST /admin/logout              - Log out
//! GET  /admin/orders?status=      - Order list (requires admin)
//! POST /admin/orders/{id}/status  - Change status (requires admin)
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod shop;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::models::session::{self, Flash, FlashLevel};
use crate::models::{AdminSession, session_keys};
use crate::state::AppState;

/// Data every page shares: pending flash messages, the cart badge and
/// whether to show the admin link.
///
/// Extracting a `Layout` takes the session's flash messages, so only
/// handlers that render a page should ask for one.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub flashes: Vec<Flash>,
    pub cart_count: u64,
    pub is_admin: bool,
}

impl Layout {
    /// Show an extra message on this render only.
    #[must_use]
    pub fn with_flash(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
        self
    }

    async fn load(session: &Session) -> Result<Self, AppError> {
        let flashes = session::take_flashes(session).await?;
        let cart_count = session::load_cart(session).await?.item_count();
        let is_admin = session
            .get::<AdminSession>(session_keys::CURRENT_ADMIN)
            .await?
            .is_some();

        Ok(Self {
            flashes,
            cart_count,
            is_admin,
        })
    }
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Self::load(&session).await
    }
}

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// The 404 page without session data, for errors raised inside handlers.
pub(crate) fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            layout: Layout::default(),
        },
    )
        .into_response()
}

/// Fallback for unrouted paths.
async fn not_found(layout: Layout) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
}

/// Create the admin routes router.
///
/// The login POST gets its own rate limiter.
pub fn admin_routes() -> Router<AppState> {
    let login = Router::new()
        .route("/session", post(admin::login))
        .layer(crate::middleware::login_rate_limiter());

    Router::new()
        .route("/login", get(admin::login_page))
        .merge(login)
        .route("/logout", post(admin::logout))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", post(admin::update_status))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/shop", get(shop::index))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/thank-you", get(checkout::thank_you))
        .route("/contact", get(contact::show).post(contact::submit))
        .nest("/admin", admin_routes())
        .fallback(not_found)
}
