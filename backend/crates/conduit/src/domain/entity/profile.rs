//! Profile Projection
//!
//! Public view of a user relative to the requesting identity.

use kernel::id::UserId;

use crate::domain::value_object::UserName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Owning user (not serialized outward)
    pub user_id: UserId,
    pub username: UserName,
    pub bio: Option<String>,
    pub image: Option<String>,
    /// Whether the requester follows this user; `false` for anonymous
    pub following: bool,
}
