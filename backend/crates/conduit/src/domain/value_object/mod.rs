//! Value Objects

pub mod email;
pub mod slug;
pub mod user_name;

pub use email::Email;
pub use self::slug::Slug;
pub use user_name::UserName;
