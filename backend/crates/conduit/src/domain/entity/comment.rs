//! Comment Entity

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, CommentId, UserId};

use crate::domain::entity::profile::Profile;

/// Comment entity; removed together with its parent article
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub article_id: ArticleId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub article_id: ArticleId,
    pub author_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment: Comment,
    pub author: Option<Profile>,
}
