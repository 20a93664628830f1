//! Contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use libra_core::order::ValidationError;
use libra_core::{ContactError, ContactForm};
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::FlashLevel;
use crate::models::session::push_flash;
use crate::state::AppState;

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
}

/// Display the contact form.
#[instrument(skip_all)]
pub async fn show(layout: Layout) -> ContactTemplate {
    ContactTemplate {
        layout,
        form: ContactForm::default(),
    }
}

/// Store the message and notify the shop.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    match state.workflow().submit_contact_message(&form).await {
        Ok(_) => {
            push_flash(&session, FlashLevel::Success, "Faleminderit! Mesazhi u dërgua.").await?;
            Ok(Redirect::to("/contact").into_response())
        }
        Err(ContactError::Validation(e)) => {
            let message = match e {
                ValidationError::MissingFields(_) => "Ju lutem plotësoni: Emër dhe Mesazh.",
                ValidationError::InvalidEmail(_) => "Adresa e email-it nuk është e vlefshme.",
            };
            let page = ContactTemplate {
                layout: layout.with_flash(FlashLevel::Danger, message),
                form,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(ContactError::Store(e)) => Err(AppError::Store(e)),
    }
}
