//! User Name Value Object
//!
//! Public handle shown on profiles and used in `/profiles/{username}`.

use derive_more::Display;
use serde::Serialize;

use crate::error::{ConduitError, ConduitResult};

/// Maximum user name length (matches the `users.username` column)
pub const USER_NAME_MAX_LENGTH: usize = 80;

/// User name value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Create a new user name with validation
    ///
    /// Surrounding whitespace is trimmed. Inner whitespace and `/` are
    /// rejected so the name stays usable as a path segment.
    pub fn new(raw: impl Into<String>) -> ConduitResult<Self> {
        let name = raw.into().trim().to_string();

        if name.is_empty() {
            return Err(ConduitError::invalid("username", "can't be blank"));
        }

        let len = name.chars().count();
        if len > USER_NAME_MAX_LENGTH {
            return Err(ConduitError::invalid(
                "username",
                format!("is too long (maximum is {} characters)", USER_NAME_MAX_LENGTH),
            ));
        }

        if name.chars().any(|c| c.is_whitespace() || c.is_control() || c == '/') {
            return Err(ConduitError::invalid("username", "is invalid"));
        }

        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(UserName::new("  jake ").unwrap().as_str(), "jake");
        assert!(UserName::new("ジェイク").is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(UserName::new("").is_err());
        assert!(UserName::new("   ").is_err());
        assert!(UserName::new("jake peralta").is_err());
        assert!(UserName::new("jake/peralta").is_err());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)).is_err());
    }
}
