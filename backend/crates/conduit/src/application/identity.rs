//! Current Identity
//!
//! Resolved once per request from the verified bearer token and passed
//! explicitly to every use case that needs it.

use kernel::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// The token the request presented
    pub token: String,
}

impl Identity {
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}

/// A user together with the token the client should keep using
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: crate::domain::entity::User,
    pub token: String,
}
