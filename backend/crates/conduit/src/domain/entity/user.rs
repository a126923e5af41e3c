//! User Entity
//!
//! Account record. The password digest never leaves the server.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{Email, UserName};

/// Maximum bio length (matches the `users.bio` column)
pub const BIO_MAX_LENGTH: usize = 300;

/// Maximum image URL length (matches the `users.image` column)
pub const IMAGE_MAX_LENGTH: usize = 120;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Surrogate key
    pub id: UserId,
    /// Unique public handle
    pub username: UserName,
    /// Unique login address
    pub email: Email,
    /// Argon2id digest (PHC string)
    pub password_hash: HashedPassword,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
}

/// Whitelisted fields a user may change on themselves
///
/// `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<UserName>,
    pub email: Option<Email>,
    pub password_hash: Option<HashedPassword>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.bio.is_none()
            && self.image.is_none()
    }
}
