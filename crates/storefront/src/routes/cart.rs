//! Cart route handlers.
//!
//! The cart lives in the session. Handlers load it, apply one
//! [`libra_core::Cart`] operation and write it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::REFERER},
    response::Redirect,
};
use libra_core::{Price, ResolvedCartLine};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use super::Layout;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::FlashLevel;
use crate::models::session::{load_cart, push_flash, save_cart};
use crate::state::AppState;

/// Prefix of the per-line quantity fields on the cart page.
pub const QUANTITY_FIELD_PREFIX: &str = "qty_";

/// Add to cart form data. Both fields stay raw; the cart decides what a
/// malformed value means.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    pub product_id: Option<String>,
    pub quantity: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub lines: Vec<ResolvedCartLine>,
    pub total: Price,
}

/// Display the cart with current prices.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
) -> Result<CartTemplate> {
    let cart = load_cart(&session).await?;
    let lookup = state.products().snapshots(&cart.product_ids()).await?;

    Ok(CartTemplate {
        layout,
        lines: cart.resolve(&lookup),
        total: Price::new(cart.total(&lookup)),
    })
}

/// Add a book to the cart and return to the page the form was on.
#[instrument(skip(session, headers))]
pub async fn add(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;

    if cart.add(form.product_id.as_deref(), form.quantity.as_deref()) {
        save_cart(&session, &cart).await?;
        push_flash(&session, FlashLevel::Success, "Produkti u shtua në shportë.").await?;
        add_breadcrumb(
            "cart",
            "Added to cart",
            &[("product_id", form.product_id.as_deref().unwrap_or_default())],
        );
    } else {
        tracing::debug!("Ignoring add-to-cart without a valid product id");
    }

    Ok(Redirect::to(&back_path(&headers)))
}

/// Replace every cart line from the `qty_<id>` fields of the cart form.
#[instrument(skip_all)]
pub async fn update(
    session: Session,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;

    cart.bulk_set(fields.iter().filter_map(|(key, value)| {
        key.strip_prefix(QUANTITY_FIELD_PREFIX)
            .map(|id| (id, value.as_str()))
    }));

    save_cart(&session, &cart).await?;
    push_flash(&session, FlashLevel::Info, "Shporta u përditësua.").await?;

    Ok(Redirect::to("/cart"))
}

/// Where to send the visitor after adding to the cart: the path and query
/// of the `Referer`, or the shop when there is none. Only the path is kept,
/// so the redirect never leaves the site.
fn back_path(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| Url::parse(referer).ok())
        .map(|url| match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_owned(),
        })
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/shop".to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn with_referer(referer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(referer).unwrap());
        headers
    }

    #[test]
    fn test_back_path_keeps_path_and_query() {
        assert_eq!(
            back_path(&with_referer("https://shop.example/shop?grade=3&q=abc")),
            "/shop?grade=3&q=abc"
        );
    }

    #[test]
    fn test_back_path_drops_foreign_host() {
        assert_eq!(back_path(&with_referer("https://evil.example/")), "/");
    }

    #[test]
    fn test_back_path_defaults_to_shop() {
        assert_eq!(back_path(&HeaderMap::new()), "/shop");
        assert_eq!(back_path(&with_referer("not a url")), "/shop");
    }
}
