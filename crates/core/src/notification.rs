//! Operator notifications.
//!
//! Notifications are advisory: the shop works the same whether or not the
//! email reaches the operator. A [`Notifier`] only accepts the message for
//! delivery; it never blocks on the mail relay.

use serde::{Deserialize, Serialize};

use crate::contact::NewContactMessage;
use crate::order::NewOrder;
use crate::types::{ContactMessageId, OrderId};

/// Why a notification was not accepted or not delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    /// The mail relay is not configured; the channel is disabled.
    #[error("notification channel is not configured")]
    NotConfigured,

    /// The delivery worker has shut down.
    #[error("notification queue is closed")]
    QueueClosed,

    /// The relay rejected or failed to deliver the message.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Something the operator should hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A customer placed an order.
    NewOrder {
        order_id: OrderId,
        order: NewOrder,
    },
    /// A visitor sent a message through the contact form.
    ContactMessage {
        message_id: ContactMessageId,
        message: NewContactMessage,
    },
}

impl Notification {
    /// Email subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::NewOrder { order_id, .. } => format!("Porosi e re #{order_id}"),
            Self::ContactMessage { .. } => "Mesazh i ri nga faqja".to_owned(),
        }
    }
}

/// Accepts notifications for best-effort delivery.
pub trait Notifier: Sync {
    /// Hand `notification` off for delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`NotificationError`] if the notification could not be
    /// accepted. Callers log it and carry on.
    fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}
