//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::id::CommentId;
use platform::password::PasswordHasher;
use platform::token::TokenIssuer;
use serde_json::json;
use std::sync::Arc;

use crate::application::config::ConduitConfig;
use crate::application::{
    ArticleUseCase, CommentUseCase, CreateArticleInput, CurrentUserUseCase, LoginInput,
    LoginUseCase, ProfileUseCase, RegisterInput, RegisterUseCase, TagUseCase,
};
use crate::domain::entity::{ArticleFilter, ArticleView, CommentView};
use crate::domain::repository::ConduitRepository;
use crate::error::{ConduitError, ConduitResult};
use crate::presentation::dto::{
    ArticleInput, ArticleOutput, CommentInput, CommentOutput, FeedQuery, ListArticlesQuery,
    LoginUserInput, ProfileOutput, RegisterUserInput, TagOutput, UpdateArticleInput,
    UpdateUserInput, UserOutput,
};
use crate::presentation::envelope::{Collection, Envelope};
use crate::presentation::extract::{AuthUser, MaybeAuthUser};

/// Shared state for conduit handlers
pub struct ConduitAppState<R>
where
    R: ConduitRepository,
{
    pub repo: Arc<R>,
    pub config: Arc<ConduitConfig>,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
}

impl<R> ConduitAppState<R>
where
    R: ConduitRepository,
{
    pub fn new(repo: R, config: ConduitConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            hasher: Arc::new(config.password_hasher()),
            tokens: Arc::new(config.token_issuer()),
            config: Arc::new(config),
        }
    }
}

// derive(Clone) would demand R: Clone
impl<R> Clone for ConduitAppState<R>
where
    R: ConduitRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            hasher: self.hasher.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<R> FromRef<ConduitAppState<R>> for Arc<TokenIssuer>
where
    R: ConduitRepository,
{
    fn from_ref(state: &ConduitAppState<R>) -> Self {
        state.tokens.clone()
    }
}

fn article_output(view: ArticleView) -> ConduitResult<Envelope<ArticleOutput>> {
    ArticleOutput::try_from(view).map(Envelope)
}

fn articles_output(views: Vec<ArticleView>) -> ConduitResult<Collection<ArticleOutput>> {
    views
        .into_iter()
        .map(ArticleOutput::try_from)
        .collect::<ConduitResult<Vec<_>>>()
        .map(Collection)
}

fn comment_output(view: CommentView) -> ConduitResult<Envelope<CommentOutput>> {
    CommentOutput::try_from(view).map(Envelope)
}

fn query_error(rejection: QueryRejection) -> ConduitError {
    ConduitError::invalid("query", rejection.body_text())
}

fn path_error(rejection: PathRejection) -> ConduitError {
    ConduitError::invalid("path", rejection.body_text())
}

/// Empty JSON object for deletes
fn deleted() -> Json<serde_json::Value> {
    Json(json!({}))
}

// ============================================================================
// Users
// ============================================================================

/// POST /api/users
pub async fn register<R>(
    State(state): State<ConduitAppState<R>>,
    Envelope(req): Envelope<RegisterUserInput>,
) -> ConduitResult<impl IntoResponse>
where
    R: ConduitRepository,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Envelope(UserOutput::from(output))))
}

/// POST /api/users/login
pub async fn login<R>(
    State(state): State<ConduitAppState<R>>,
    Envelope(req): Envelope<LoginUserInput>,
) -> ConduitResult<Envelope<UserOutput>>
where
    R: ConduitRepository,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Envelope(output.into()))
}

/// GET /api/user
pub async fn current_user<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
) -> ConduitResult<Envelope<UserOutput>>
where
    R: ConduitRepository,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.hasher.clone());
    let output = use_case.get(&identity).await?;
    Ok(Envelope(output.into()))
}

/// PUT /api/user
pub async fn update_user<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    Envelope(req): Envelope<UpdateUserInput>,
) -> ConduitResult<Envelope<UserOutput>>
where
    R: ConduitRepository,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.hasher.clone());

    let output = use_case
        .update(
            &identity,
            crate::application::UpdateUserInput {
                username: req.username,
                email: req.email,
                password: req.password,
                bio: req.bio,
                image: req.image,
            },
        )
        .await?;

    Ok(Envelope(output.into()))
}

// ============================================================================
// Profiles
// ============================================================================

/// GET /api/profiles/{username}
pub async fn get_profile<R>(
    State(state): State<ConduitAppState<R>>,
    viewer: MaybeAuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ProfileOutput>>
where
    R: ConduitRepository,
{
    let Path(username) = path.map_err(path_error)?;
    let use_case = ProfileUseCase::new(state.repo.clone());
    let profile = use_case.get(viewer.identity(), &username).await?;
    Ok(Envelope(profile.into()))
}

/// POST /api/profiles/{username}/follow
pub async fn follow<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ProfileOutput>>
where
    R: ConduitRepository,
{
    let Path(username) = path.map_err(path_error)?;
    let use_case = ProfileUseCase::new(state.repo.clone());
    let profile = use_case.follow(&identity, &username).await?;
    Ok(Envelope(profile.into()))
}

/// DELETE /api/profiles/{username}/follow
pub async fn unfollow<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ProfileOutput>>
where
    R: ConduitRepository,
{
    let Path(username) = path.map_err(path_error)?;
    let use_case = ProfileUseCase::new(state.repo.clone());
    let profile = use_case.unfollow(&identity, &username).await?;
    Ok(Envelope(profile.into()))
}

// ============================================================================
// Articles
// ============================================================================

/// GET /api/articles
pub async fn list_articles<R>(
    State(state): State<ConduitAppState<R>>,
    viewer: MaybeAuthUser,
    query: Result<Query<ListArticlesQuery>, QueryRejection>,
) -> ConduitResult<Collection<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Query(query) = query.map_err(query_error)?;
    let (limit, offset) = state.config.page(query.limit, query.offset);

    let filter = ArticleFilter {
        tag: query.tag,
        author: query.author,
        favorited_by: query.favorited,
        limit,
        offset,
    };

    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    let views = use_case.list(viewer.identity(), filter).await?;
    articles_output(views)
}

/// GET /api/articles/feed
pub async fn feed<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ConduitResult<Collection<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Query(query) = query.map_err(query_error)?;
    let (limit, offset) = state.config.page(query.limit, query.offset);

    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    let views = use_case.feed(&identity, limit, offset).await?;
    articles_output(views)
}

/// POST /api/articles
pub async fn create_article<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    Envelope(req): Envelope<ArticleInput>,
) -> ConduitResult<impl IntoResponse>
where
    R: ConduitRepository,
{
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());

    let view = use_case
        .create(
            &identity,
            CreateArticleInput {
                title: req.title,
                description: req.description,
                body: req.body,
                tag_list: req.tag_list,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, article_output(view)?))
}

/// GET /api/articles/{slug}
pub async fn get_article<R>(
    State(state): State<ConduitAppState<R>>,
    viewer: MaybeAuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    let view = use_case.get(viewer.identity(), &slug).await?;
    article_output(view)
}

/// PUT /api/articles/{slug}
pub async fn update_article<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
    Envelope(req): Envelope<UpdateArticleInput>,
) -> ConduitResult<Envelope<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());

    let view = use_case
        .update(
            &identity,
            &slug,
            crate::application::UpdateArticleInput {
                title: req.title,
                description: req.description,
                body: req.body,
            },
        )
        .await?;

    article_output(view)
}

/// DELETE /api/articles/{slug}
pub async fn delete_article<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<impl IntoResponse>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.delete(&identity, &slug).await?;
    Ok(deleted())
}

/// POST /api/articles/{slug}/favorite
pub async fn favorite<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    let view = use_case.favorite(&identity, &slug).await?;
    article_output(view)
}

/// DELETE /api/articles/{slug}/favorite
pub async fn unfavorite<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Envelope<ArticleOutput>>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = ArticleUseCase::new(state.repo.clone(), state.repo.clone());
    let view = use_case.unfavorite(&identity, &slug).await?;
    article_output(view)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/articles/{slug}/comments
pub async fn list_comments<R>(
    State(state): State<ConduitAppState<R>>,
    viewer: MaybeAuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ConduitResult<Collection<CommentOutput>>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = CommentUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());

    use_case
        .list(viewer.identity(), &slug)
        .await?
        .into_iter()
        .map(CommentOutput::try_from)
        .collect::<ConduitResult<Vec<_>>>()
        .map(Collection)
}

/// POST /api/articles/{slug}/comments
pub async fn add_comment<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
    Envelope(req): Envelope<CommentInput>,
) -> ConduitResult<impl IntoResponse>
where
    R: ConduitRepository,
{
    let Path(slug) = path.map_err(path_error)?;
    let use_case = CommentUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    let view = use_case.add(&identity, &slug, req.body).await?;
    Ok((StatusCode::CREATED, comment_output(view)?))
}

/// DELETE /api/articles/{slug}/comments/{id}
pub async fn delete_comment<R>(
    State(state): State<ConduitAppState<R>>,
    AuthUser(identity): AuthUser,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ConduitResult<impl IntoResponse>
where
    R: ConduitRepository,
{
    let Path((slug, id)) = path.map_err(path_error)?;
    // A non-numeric id can never name a comment
    let id = id
        .parse::<i64>()
        .map(CommentId::new)
        .map_err(|_| ConduitError::NotFound("comment"))?;

    let use_case = CommentUseCase::new(state.repo.clone(), state.repo.clone(), state.repo.clone());
    use_case.delete(&identity, &slug, id).await?;
    Ok(deleted())
}

// ============================================================================
// Tags
// ============================================================================

/// GET /api/tags
pub async fn list_tags<R>(
    State(state): State<ConduitAppState<R>>,
) -> ConduitResult<Collection<TagOutput>>
where
    R: ConduitRepository,
{
    let use_case = TagUseCase::new(state.repo.clone());
    let tags = use_case.list().await?;
    Ok(Collection(tags.into_iter().map(TagOutput).collect()))
}
