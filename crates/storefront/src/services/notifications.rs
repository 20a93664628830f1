//! Background delivery of operator notifications.
//!
//! Request handlers push notifications onto an unbounded channel and return
//! immediately. A single tokio task renders and mails them, so a slow or
//! failing SMTP relay never delays a checkout.

use libra_core::{Notification, NotificationError, Notifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::email::{EmailService, render_notification};

/// Sending half of the notification channel.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: Option<mpsc::UnboundedSender<Notification>>,
}

impl NotificationQueue {
    /// A queue that rejects everything with `NotConfigured`.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { sender: None }
    }

    /// Start the delivery worker and return the queue feeding it.
    ///
    /// The worker exits once every clone of the queue has been dropped and
    /// the channel is drained.
    #[must_use]
    pub fn start(email: EmailService, base_url: String) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(receiver, email, base_url));
        (
            Self {
                sender: Some(sender),
            },
            worker,
        )
    }

    /// Whether notifications are being delivered at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or(NotificationError::NotConfigured)?;
        sender
            .send(notification)
            .map_err(|_| NotificationError::QueueClosed)
    }
}

async fn deliver(
    mut receiver: mpsc::UnboundedReceiver<Notification>,
    email: EmailService,
    base_url: String,
) {
    while let Some(notification) = receiver.recv().await {
        let subject = notification.subject();
        let rendered = match render_notification(&notification, &base_url) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(error = %e, subject = %subject, "Failed to render notification");
                continue;
            }
        };
        if let Err(e) = email.send(&rendered).await {
            let e = NotificationError::Delivery(e.to_string());
            tracing::warn!(error = %e, subject = %subject, "Notification not delivered");
        }
    }
    tracing::info!("Notification worker stopped");
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use libra_core::{ContactForm, ContactMessageId, NewContactMessage};

    use super::*;

    fn notification() -> Notification {
        let message = NewContactMessage::parse(
            &ContactForm {
                name: "Besa".to_string(),
                message: "Pyetje".to_string(),
                ..ContactForm::default()
            },
            Utc::now(),
        );
        let Ok(message) = message else {
            panic!("valid contact form rejected");
        };
        Notification::ContactMessage {
            message_id: ContactMessageId::new(1),
            message,
        }
    }

    #[test]
    fn test_disabled_queue_reports_not_configured() {
        let queue = NotificationQueue::disabled();
        assert!(!queue.is_enabled());
        assert_eq!(
            queue.notify(notification()),
            Err(NotificationError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_queue_hands_off_without_waiting() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let queue = NotificationQueue {
            sender: Some(sender),
        };

        assert_eq!(queue.notify(notification()), Ok(()));
        assert!(matches!(
            receiver.recv().await,
            Some(Notification::ContactMessage { .. })
        ));
    }

    #[test]
    fn test_closed_queue_reports_queue_closed() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let queue = NotificationQueue {
            sender: Some(sender),
        };

        assert_eq!(
            queue.notify(notification()),
            Err(NotificationError::QueueClosed)
        );
    }
}
