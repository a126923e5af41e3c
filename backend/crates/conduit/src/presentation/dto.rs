//! API DTOs (Data Transfer Objects)
//!
//! Each entity has an input type (writable fields, load-only) and an
//! output type (writable plus server-computed fields, dump-only).

use chrono::{DateTime, SecondsFormat, Utc};
use kernel::id::CommentId;
use serde::{Deserialize, Serialize, Serializer};

use crate::application::identity::AuthenticatedUser;
use crate::domain::entity::{ArticleView, CommentView, Profile};
use crate::error::{ConduitError, ConduitResult};
use crate::presentation::envelope::{CollectionResource, Resource};

/// ISO-8601 with millisecond precision, e.g. `2016-02-18T03:22:56.637Z`
fn iso8601<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// Users
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Resource for RegisterUserInput {
    const KEY: &'static str = "user";
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUserInput {
    pub email: String,
    pub password: String,
}

impl Resource for LoginUserInput {
    const KEY: &'static str = "user";
}

/// Update current user request; every field optional, `id` never accepted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl Resource for UpdateUserInput {
    const KEY: &'static str = "user";
}

/// User response; the password digest is never part of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOutput {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl Resource for UserOutput {
    const KEY: &'static str = "user";
}

impl From<AuthenticatedUser> for UserOutput {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            email: auth.user.email.as_str().to_owned(),
            token: auth.token,
            username: auth.user.username.as_str().to_owned(),
            bio: auth.user.bio,
            image: auth.user.image,
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileOutput {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl Resource for ProfileOutput {
    const KEY: &'static str = "profile";
}

impl From<Profile> for ProfileOutput {
    fn from(profile: Profile) -> Self {
        Self {
            username: profile.username.as_str().to_owned(),
            bio: profile.bio,
            image: profile.image,
            following: profile.following,
        }
    }
}

/// Project a resolved author, failing loudly when it did not resolve
fn author_output(author: Option<Profile>) -> ConduitResult<ProfileOutput> {
    author
        .map(ProfileOutput::from)
        .ok_or_else(|| ConduitError::integrity("author", "could not be resolved"))
}

// ============================================================================
// Articles
// ============================================================================

/// Create article request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

impl Resource for ArticleInput {
    const KEY: &'static str = "article";
}

/// Update article request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl Resource for UpdateArticleInput {
    const KEY: &'static str = "article";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleOutput {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileOutput,
}

impl Resource for ArticleOutput {
    const KEY: &'static str = "article";
}

impl CollectionResource for ArticleOutput {
    const COLLECTION_KEY: &'static str = "articles";
    const COUNT_KEY: &'static str = "articlesCount";
}

impl TryFrom<ArticleView> for ArticleOutput {
    type Error = ConduitError;

    fn try_from(view: ArticleView) -> ConduitResult<Self> {
        let author = author_output(view.author)?;
        let article = view.article;

        Ok(Self {
            slug: article.slug.as_str().to_owned(),
            title: article.title,
            description: article.description,
            body: article.body,
            tag_list: article.tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited: view.favorited,
            favorites_count: view.favorites_count,
            author,
        })
    }
}

/// Query string of `GET /articles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query string of `GET /articles/feed`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub body: String,
}

impl Resource for CommentInput {
    const KEY: &'static str = "comment";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOutput {
    pub id: CommentId,
    #[serde(serialize_with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso8601")]
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: ProfileOutput,
}

impl Resource for CommentOutput {
    const KEY: &'static str = "comment";
}

impl CollectionResource for CommentOutput {
    const COLLECTION_KEY: &'static str = "comments";
    const COUNT_KEY: &'static str = "commentsCount";
}

impl TryFrom<CommentView> for CommentOutput {
    type Error = ConduitError;

    fn try_from(view: CommentView) -> ConduitResult<Self> {
        let author = author_output(view.author)?;
        let comment = view.comment;

        Ok(Self {
            id: comment.id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body,
            author,
        })
    }
}

// ============================================================================
// Tags
// ============================================================================

/// A tag name; listed as `{"tags": [...], "tagsCount": n}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagOutput(pub String);

impl Resource for TagOutput {
    const KEY: &'static str = "tag";
}

impl CollectionResource for TagOutput {
    const COLLECTION_KEY: &'static str = "tags";
    const COUNT_KEY: &'static str = "tagsCount";
}
