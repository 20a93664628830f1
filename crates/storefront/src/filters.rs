//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Label for a school grade.
///
/// Usage in templates: `{{ product.grade|grade_label }}` renders `Klasa 3`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn grade_label(grade: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("Klasa {grade}"))
}
