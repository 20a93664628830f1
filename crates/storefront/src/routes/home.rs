//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use libra_core::Product;
use libra_core::catalog::{FEATURED_LIMIT, GRADES};
use tracing::instrument;

use super::Layout;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
    pub grades: &'static [i16],
}

/// Display the home page: the newest books and a link per grade.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, layout: Layout) -> Result<HomeTemplate> {
    let products = state.products().featured(FEATURED_LIMIT).await?;

    Ok(HomeTemplate {
        layout,
        products,
        grades: &GRADES,
    })
}
