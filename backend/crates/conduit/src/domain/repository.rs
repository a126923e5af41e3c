//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! `viewer` is the requesting identity; it drives the relational
//! `following` and `favorited` flags and is `None` for anonymous requests.

use kernel::id::{ArticleId, CommentId, UserId};

use crate::domain::entity::{
    Article, ArticleChanges, ArticleFilter, ArticleView, Comment, CommentView, NewArticle,
    NewComment, NewUser, Profile, User, UserChanges,
};
use crate::domain::value_object::{Email, Slug, UserName};
use crate::error::ConduitResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a user and its profile row in one transaction
    ///
    /// A uniqueness violation rolls both back and surfaces as
    /// `ConduitError::Integrity`.
    async fn create(&self, user: &NewUser) -> ConduitResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> ConduitResult<Option<User>>;

    /// Find user by (normalized) email
    async fn find_by_email(&self, email: &Email) -> ConduitResult<Option<User>>;

    /// Apply whitelisted changes and bump `updated_at`
    async fn update(&self, id: UserId, changes: &UserChanges) -> ConduitResult<User>;
}

/// Profile repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Find profile by user name
    async fn find_by_username(
        &self,
        username: &UserName,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>>;

    /// Find profile by user ID
    async fn find_by_user_id(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>>;

    /// Record that `follower` follows `followed` (idempotent)
    async fn follow(&self, follower: UserId, followed: UserId) -> ConduitResult<()>;

    /// Remove the follow relation if present
    async fn unfollow(&self, follower: UserId, followed: UserId) -> ConduitResult<()>;
}

/// Article repository trait
#[trait_variant::make(ArticleRepository: Send)]
pub trait LocalArticleRepository {
    /// Create an article and its tags in one transaction
    ///
    /// Duplicate tag names are stored once, keeping first-seen order.
    async fn create(&self, article: &NewArticle) -> ConduitResult<Article>;

    /// Find article by slug
    async fn find_by_slug(
        &self,
        slug: &Slug,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<ArticleView>>;

    /// List articles, most recent first
    async fn list(
        &self,
        filter: &ArticleFilter,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<ArticleView>>;

    /// Articles by users `follower` follows, most recent first
    async fn feed(
        &self,
        follower: UserId,
        limit: i64,
        offset: i64,
    ) -> ConduitResult<Vec<ArticleView>>;

    /// Apply owner changes and bump `updated_at`
    async fn update(&self, id: ArticleId, changes: &ArticleChanges) -> ConduitResult<Article>;

    /// Delete an article; comments, tags links and favorites cascade
    async fn delete(&self, id: ArticleId) -> ConduitResult<()>;

    /// Favorite an article (idempotent)
    async fn favorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()>;

    /// Remove a favorite if present
    async fn unfavorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    /// Create a comment
    async fn create(&self, comment: &NewComment) -> ConduitResult<Comment>;

    /// Find comment by ID
    async fn find_by_id(&self, id: CommentId) -> ConduitResult<Option<Comment>>;

    /// Comments on an article, most recent first
    async fn list_for_article(
        &self,
        article: ArticleId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<CommentView>>;

    /// Delete a comment
    async fn delete(&self, id: CommentId) -> ConduitResult<()>;
}

/// Tag repository trait
#[trait_variant::make(TagRepository: Send)]
pub trait LocalTagRepository {
    /// All tag names, ordered by name
    async fn list(&self) -> ConduitResult<Vec<String>>;
}

/// Every repository the HTTP layer needs, behind one type
pub trait ConduitRepository:
    UserRepository
    + ProfileRepository
    + ArticleRepository
    + CommentRepository
    + TagRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> ConduitRepository for T where
    T: UserRepository
        + ProfileRepository
        + ArticleRepository
        + CommentRepository
        + TagRepository
        + Send
        + Sync
        + 'static
{
}
