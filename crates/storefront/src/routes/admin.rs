//! Admin console route handlers.
//!
//! One shared password unlocks the order list. Orders can only be moved
//! between the statuses in [`OrderStatus::ALL`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use libra_core::{OrderId, OrderStatus, OrderSummary};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::middleware::auth::ADMIN_LOGIN_PATH;
use crate::models::FlashLevel;
use crate::models::session::{clear_current_admin, push_flash, set_current_admin};
use crate::state::AppState;

const ORDERS_PATH: &str = "/admin/orders";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

/// Order list filter.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderSummary>,
    pub statuses: &'static [OrderStatus],
    /// Currently applied filter, empty for all orders.
    pub selected: &'static str,
}

/// Display the password form. A logged-in admin goes straight to the orders.
#[instrument(skip_all)]
pub async fn login_page(layout: Layout) -> Response {
    if layout.is_admin {
        return Redirect::to(ORDERS_PATH).into_response();
    }
    LoginTemplate { layout }.into_response()
}

/// Check the password and mark the session as admin.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    match state.admin_auth().authenticate(&form.password) {
        Ok(()) => {
            set_current_admin(&session).await?;
            tracing::info!("Admin logged in");
            Ok(Redirect::to(ORDERS_PATH))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin login failed");
            push_flash(&session, FlashLevel::Danger, "Fjalëkalim i pasaktë.").await?;
            Ok(Redirect::to(ADMIN_LOGIN_PATH))
        }
    }
}

/// Drop the admin marker.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    push_flash(&session, FlashLevel::Info, "Dolate nga admin.").await?;
    Ok(Redirect::to("/"))
}

/// Orders newest first, optionally for one status.
///
/// A status outside the known set is ignored and every order is listed.
#[instrument(skip(state, layout, _admin))]
pub async fn orders(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    layout: Layout,
    Query(params): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let status = params
        .status
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| raw.parse::<OrderStatus>().ok());

    let orders = state.workflow().list_orders(status).await?;

    Ok(OrdersTemplate {
        layout,
        orders,
        statuses: &OrderStatus::ALL,
        selected: status.as_ref().map_or("", OrderStatus::as_str),
    })
}

/// Move an order to a new status. Unknown order ids are a silent no-op.
#[instrument(skip(state, session, _admin))]
pub async fn update_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        tracing::warn!(status = %form.status, "Rejected unknown order status");
        push_flash(&session, FlashLevel::Danger, "Status i panjohur.").await?;
        return Ok(Redirect::to(ORDERS_PATH));
    };

    let order_id = OrderId::new(id);
    if !state.workflow().update_order_status(order_id, status).await? {
        tracing::debug!(%order_id, "Status update for unknown order ignored");
    }
    push_flash(
        &session,
        FlashLevel::Success,
        format!("Statusi u përditësua në {status}."),
    )
    .await?;

    Ok(Redirect::to(ORDERS_PATH))
}
