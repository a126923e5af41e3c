//! Article Entity

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, UserId};

use crate::domain::entity::profile::Profile;
use crate::domain::value_object::Slug;

/// Article entity
#[derive(Debug, Clone)]
pub struct Article {
    pub id: ArticleId,
    /// Unique, derived from the title
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    /// Tag names in the order they were given
    pub tag_list: Vec<String>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new article
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub author_id: UserId,
}

/// Owner-editable fields; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    /// Regenerated whenever the title changes
    pub slug: Option<Slug>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// Article with the fields computed relative to a requester
#[derive(Debug, Clone)]
pub struct ArticleView {
    pub article: Article,
    /// Resolved author profile; `None` if the relation failed to resolve
    pub author: Option<Profile>,
    pub favorited: bool,
    pub favorites_count: i64,
}

/// Filters for listing articles
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    /// Author user name
    pub author: Option<String>,
    /// User name of someone who favorited the article
    pub favorited_by: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
