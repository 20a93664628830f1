//! Contact message repository.

use libra_core::{ContactMessageId, MessageStore, NewContactMessage, StoreError};
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;

/// Repository for contact form submissions.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a contact message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip_all)]
    pub async fn insert(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, RepositoryError> {
        let (id,): (ContactMessageId,) = sqlx::query_as(
            r"
            INSERT INTO shop.messages (name, email, phone, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_ref().map(libra_core::Email::as_str))
        .bind(message.phone.as_deref())
        .bind(&message.message)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

impl MessageStore for MessageRepository {
    async fn create_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, StoreError> {
        Ok(self.insert(message).await?)
    }
}
