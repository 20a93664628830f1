//! Checkout and confirmation route handlers.
//!
//! Payment is cash on delivery, so checkout only collects delivery details
//! and records the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use libra_core::{CheckoutError, CheckoutForm, OrderId, OrderWithItems, Price, ResolvedCartLine};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::FlashLevel;
use crate::models::session::{
    Flash, last_order, load_cart, push_flash, save_cart, set_last_order,
};
use crate::state::AppState;

const EMPTY_CART: &str = "Shporta është bosh.";
const MISSING_FIELDS: &str = "Ju lutem plotësoni: Emër, Telefon, Adresë.";
const PRODUCTS_GONE: &str =
    "Disa libra në shportë nuk janë më në dispozicion. Ju lutem përditësoni shportën.";
const ORDER_TOO_LARGE: &str =
    "Sasia e porosisë është shumë e madhe. Ju lutem zvogëloni sasitë në shportë.";

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub lines: Vec<ResolvedCartLine>,
    pub total: Price,
    pub form: CheckoutForm,
}

/// Thank-you page template. `order` is only filled in for the session that
/// placed the order.
#[derive(Template, WebTemplate)]
#[template(path = "thank_you.html")]
pub struct ThankYouTemplate {
    pub layout: Layout,
    pub order: Option<OrderWithItems>,
}

/// Query parameters for the thank-you page.
#[derive(Debug, Default, Deserialize)]
pub struct ThankYouQuery {
    pub order_id: Option<String>,
}

/// Put flashes the layout already took back into the session, for handlers
/// that redirect instead of rendering.
async fn restore_flashes(session: &Session, flashes: Vec<Flash>) -> Result<()> {
    for flash in flashes {
        push_flash(session, flash.level, flash.message).await?;
    }
    Ok(())
}

async fn checkout_page(
    state: &AppState,
    session: &Session,
    layout: Layout,
    form: CheckoutForm,
) -> Result<CheckoutTemplate> {
    let cart = load_cart(session).await?;
    let lookup = state.products().snapshots(&cart.product_ids()).await?;

    Ok(CheckoutTemplate {
        layout,
        lines: cart.resolve(&lookup),
        total: Price::new(cart.total(&lookup)),
        form,
    })
}

/// Display the delivery form, or send an empty cart back to the shop.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
) -> Result<Response> {
    if load_cart(&session).await?.is_empty() {
        restore_flashes(&session, layout.flashes).await?;
        push_flash(&session, FlashLevel::Warning, EMPTY_CART).await?;
        return Ok(Redirect::to("/shop").into_response());
    }

    Ok(checkout_page(&state, &session, layout, CheckoutForm::default())
        .await?
        .into_response())
}

/// Place the order.
///
/// Validation errors re-render the form with what was typed. A vanished
/// product or an oversized order sends the visitor back to the cart with the
/// cart untouched.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    match state.workflow().checkout(&mut cart, &form).await {
        Ok(order_id) => {
            restore_flashes(&session, layout.flashes).await?;
            save_cart(&session, &cart).await?;
            set_last_order(&session, order_id).await?;
            Ok(Redirect::to(&format!("/thank-you?order_id={order_id}")).into_response())
        }
        Err(CheckoutError::EmptyCart) => {
            restore_flashes(&session, layout.flashes).await?;
            push_flash(&session, FlashLevel::Warning, EMPTY_CART).await?;
            Ok(Redirect::to("/shop").into_response())
        }
        Err(CheckoutError::Validation(e)) => {
            tracing::debug!(error = %e, "Checkout form rejected");
            let layout = layout.with_flash(FlashLevel::Danger, MISSING_FIELDS);
            let page = checkout_page(&state, &session, layout, form).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(CheckoutError::ProductsNotFound(_)) => {
            restore_flashes(&session, layout.flashes).await?;
            push_flash(&session, FlashLevel::Danger, PRODUCTS_GONE).await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(CheckoutError::OrderTooLarge) => {
            restore_flashes(&session, layout.flashes).await?;
            push_flash(&session, FlashLevel::Danger, ORDER_TOO_LARGE).await?;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(CheckoutError::Store(e)) => Err(AppError::Store(e)),
    }
}

/// Confirmation page.
///
/// Anyone may land here, but order details are only shown when the id is
/// the one this session just placed.
#[instrument(skip(state, session, layout))]
pub async fn thank_you(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Query(params): Query<ThankYouQuery>,
) -> Result<ThankYouTemplate> {
    let requested = params
        .order_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<OrderId>().ok());

    let order = match (requested, last_order(&session).await?) {
        (Some(requested), Some(placed)) if requested == placed => {
            state.workflow().order(requested).await?
        }
        _ => None,
    };

    Ok(ThankYouTemplate { layout, order })
}
