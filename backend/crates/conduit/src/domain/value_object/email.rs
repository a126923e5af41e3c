//! Email Value Object
//!
//! Represents a validated email address.
//! Basic validation only.

use derive_more::Display;
use serde::Serialize;

use crate::error::{ConduitError, ConduitResult};

/// Maximum email length (matches the `users.email` column)
const EMAIL_MAX_LENGTH: usize = 100;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    ///
    /// The address is trimmed and lowercased so lookups are
    /// case-insensitive.
    pub fn new(email: impl Into<String>) -> ConduitResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(ConduitError::invalid("email", "can't be blank"));
        }

        if email.chars().count() > EMAIL_MAX_LENGTH {
            return Err(ConduitError::invalid(
                "email",
                format!("is too long (maximum is {} characters)", EMAIL_MAX_LENGTH),
            ));
        }

        if !Self::is_valid_format(&email) {
            return Err(ConduitError::invalid("email", "is invalid"));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if domain.contains('@') {
            return false;
        }

        if local.is_empty() || local.len() > 64 || local.chars().any(char::is_whitespace) {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        !(domain.starts_with('.')
            || domain.ends_with('.')
            || domain.starts_with('-')
            || domain.ends_with('-'))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
