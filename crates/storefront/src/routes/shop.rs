//! Catalog search route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use libra_core::catalog::GRADES;
use libra_core::{CatalogFilter, Product};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Query parameters for the shop page. Both are kept as raw strings so a
/// malformed grade is ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    pub grade: Option<String>,
    pub q: Option<String>,
}

/// One entry of the grade dropdown.
pub struct GradeOption {
    pub value: i16,
    pub selected: bool,
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
    pub grade_options: Vec<GradeOption>,
    pub query: String,
}

/// List books, optionally filtered by grade and free text.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    Query(params): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let filter = CatalogFilter::from_query(params.grade.as_deref(), params.q.as_deref());
    let products = state.products().find(&filter).await?;

    let grade_options = GRADES
        .iter()
        .map(|&value| GradeOption {
            value,
            selected: filter.grade == Some(value),
        })
        .collect();

    Ok(ShopTemplate {
        layout,
        products,
        grade_options,
        query: filter.text.unwrap_or_default(),
    })
}
