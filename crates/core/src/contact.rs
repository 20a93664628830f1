//! Contact form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::ValidationError;
use crate::types::Email;

/// Raw contact form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

/// A validated contact message ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewContactMessage {
    /// Validate contact form input.
    ///
    /// Name and message are required. Email and phone are optional, but an
    /// email that is present must be well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] for a blank name or
    /// message, or [`ValidationError::InvalidEmail`] for a malformed email.
    pub fn parse(form: &ContactForm, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = form.name.trim();
        let message = form.message.trim();

        let missing: Vec<&'static str> = [("name", name), ("message", message)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let email = match form.email.trim() {
            "" => None,
            raw => Some(Email::parse(raw)?),
        };
        let phone = form.phone.trim();

        Ok(Self {
            name: name.to_owned(),
            email,
            phone: (!phone.is_empty()).then(|| phone.to_owned()),
            message: message.to_owned(),
            created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, phone: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn test_optional_fields_become_none_when_blank() {
        let msg = NewContactMessage::parse(&form("Besa", " ", "", "A keni Abetaren?"), Utc::now())
            .unwrap();
        assert_eq!(msg.email, None);
        assert_eq!(msg.phone, None);
        assert_eq!(msg.message, "A keni Abetaren?");
    }

    #[test]
    fn test_requires_name_and_message() {
        let err = NewContactMessage::parse(&form("", "", "", "  "), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["name", "message"])
        );
    }

    #[test]
    fn test_rejects_malformed_email() {
        let err = NewContactMessage::parse(&form("Besa", "besa@", "", "Pyetje"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail(_)));
    }

    #[test]
    fn test_keeps_valid_email_and_phone() {
        let msg = NewContactMessage::parse(
            &form("Besa", "besa@example.com", "049 111 222", "Pyetje"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(msg.email.unwrap().as_str(), "besa@example.com");
        assert_eq!(msg.phone.as_deref(), Some("049 111 222"));
    }
}
