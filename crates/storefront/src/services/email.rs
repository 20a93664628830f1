//! Email service for operator notifications.
//!
//! Uses SMTP via lettre (STARTTLS relay) with Askama HTML and plain-text
//! templates. Every message goes to the single operator address from
//! configuration.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use libra_core::{
    ContactMessageId, NewContactMessage, NewOrder, NewOrderItem, Notification, OrderId,
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML body for a new order.
#[derive(Template)]
#[template(path = "email/new_order.html")]
struct NewOrderEmailHtml<'a> {
    order_id: OrderId,
    order: &'a NewOrder,
    items: &'a [NewOrderItem],
    admin_url: &'a str,
}

/// Plain text body for a new order.
#[derive(Template)]
#[template(path = "email/new_order.txt")]
struct NewOrderEmailText<'a> {
    order_id: OrderId,
    order: &'a NewOrder,
    items: &'a [NewOrderItem],
    admin_url: &'a str,
}

/// HTML body for a contact form message.
#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactEmailHtml<'a> {
    message_id: ContactMessageId,
    message: &'a NewContactMessage,
}

/// Plain text body for a contact form message.
#[derive(Template)]
#[template(path = "email/contact_message.txt")]
struct ContactEmailText<'a> {
    message_id: ContactMessageId,
    message: &'a NewContactMessage,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render a notification into subject, text and HTML bodies.
///
/// `base_url` is the storefront's public URL; order emails link to the
/// admin console under it.
///
/// # Errors
///
/// Returns `EmailError::Template` if a template fails to render.
pub fn render_notification(
    notification: &Notification,
    base_url: &str,
) -> Result<RenderedEmail, EmailError> {
    let subject = notification.subject();
    let (text, html) = match notification {
        Notification::NewOrder { order_id, order } => {
            let admin_url = format!("{base_url}/admin/orders");
            let html = NewOrderEmailHtml {
                order_id: *order_id,
                order,
                items: &order.items,
                admin_url: &admin_url,
            }
            .render()?;
            let text = NewOrderEmailText {
                order_id: *order_id,
                order,
                items: &order.items,
                admin_url: &admin_url,
            }
            .render()?;
            (text, html)
        }
        Notification::ContactMessage {
            message_id,
            message,
        } => {
            let html = ContactEmailHtml {
                message_id: *message_id,
                message,
            }
            .render()?;
            let text = ContactEmailText {
                message_id: *message_id,
                message,
            }
            .render()?;
            (text, html)
        }
    };

    Ok(RenderedEmail {
        subject,
        text,
        html,
    })
}

/// Email service for sending operator notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
    notify_address: Mailbox,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or an address cannot be
    /// used as a mailbox.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: mailbox(config.from_address.as_str())?,
            notify_address: mailbox(config.notify_address.as_str())?,
        })
    }

    /// Send a rendered notification to the operator.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or the relay rejects it.
    pub async fn send(&self, email: &RenderedEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from_address.clone())
            .to(self.notify_address.clone())
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html.clone()),
                    ),
            )?;

        self.mailer.send(message).await?;

        tracing::info!(to = %self.notify_address, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use libra_core::{CheckoutForm, ContactForm, CustomerInfo, Price, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn order() -> NewOrder {
        let customer = CustomerInfo::parse(&CheckoutForm {
            name: "Arta <Krasniqi>".to_string(),
            phone: "044 123 456".to_string(),
            address: "Rr. Agim Ramadani 12".to_string(),
            note: String::new(),
        })
        .unwrap();
        NewOrder::new(
            customer,
            vec![NewOrderItem {
                product_id: ProductId::new(2),
                quantity: 3,
                unit_price: Price::new(Decimal::new(650, 2)),
                title_snapshot: "Matematikë 2".to_string(),
            }],
            Utc::now(),
        )
    }

    #[test]
    fn test_order_email_lists_items_and_total() {
        let email = render_notification(
            &Notification::NewOrder {
                order_id: OrderId::new(17),
                order: order(),
            },
            "https://libra.example",
        )
        .unwrap();

        assert_eq!(email.subject, "Porosi e re #17");
        assert!(email.text.contains("Matematikë 2"));
        assert!(email.text.contains("19.50 €"));
        assert!(email.text.contains("PENDING"));
        assert!(email.html.contains("https://libra.example/admin/orders"));
    }

    #[test]
    fn test_order_email_escapes_customer_input_in_html() {
        let email = render_notification(
            &Notification::NewOrder {
                order_id: OrderId::new(1),
                order: order(),
            },
            "https://libra.example",
        )
        .unwrap();

        assert!(!email.html.contains("<Krasniqi>"));
        assert!(email.html.contains("&#60;Krasniqi&#62;") || email.html.contains("&lt;Krasniqi&gt;"));
        assert!(email.text.contains("Arta <Krasniqi>"));
    }

    #[test]
    fn test_contact_email_shows_dash_for_missing_fields() {
        let message = NewContactMessage::parse(
            &ContactForm {
                name: "Besa".to_string(),
                message: "A keni Fizikë 9?".to_string(),
                ..ContactForm::default()
            },
            Utc::now(),
        )
        .unwrap();

        let email = render_notification(
            &Notification::ContactMessage {
                message_id: ContactMessageId::new(3),
                message,
            },
            "https://libra.example",
        )
        .unwrap();

        assert_eq!(email.subject, "Mesazh i ri nga faqja");
        assert!(email.text.contains("Email: -"));
        assert!(email.html.contains("A keni Fizikë 9?"));
    }
}
