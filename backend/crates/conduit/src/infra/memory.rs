//! In-memory Repository (tests only)
//!
//! Mirrors the PostgreSQL schema closely enough for use case and router
//! tests: unique usernames, emails and slugs, cascading deletes, and
//! all-or-nothing registration.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use kernel::id::{ArticleId, CommentId, UserId};

use crate::domain::entity::{
    Article, ArticleChanges, ArticleFilter, ArticleView, Comment, CommentView, NewArticle,
    NewComment, NewUser, Profile, User, UserChanges,
};
use crate::domain::repository::{
    ArticleRepository, CommentRepository, ProfileRepository, TagRepository, UserRepository,
};
use crate::domain::value_object::{Email, Slug, UserName};
use crate::error::{ConduitError, ConduitResult};

#[derive(Default)]
struct State {
    next_id: i64,
    /// Monotonic clock so ordering by `created_at` is deterministic
    ticks: i64,
    users: Vec<User>,
    profiles: Vec<UserId>,
    follows: Vec<(UserId, UserId)>,
    articles: Vec<Article>,
    favorites: Vec<(UserId, ArticleId)>,
    comments: Vec<Comment>,
    /// Profile insert fails once when set (exercises registration rollback)
    fail_next_profile_insert: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000) + Duration::seconds(self.ticks)
    }

    fn profile(&self, id: UserId, viewer: Option<UserId>) -> Option<Profile> {
        if !self.profiles.contains(&id) {
            return None;
        }
        let user = self.users.iter().find(|u| u.id == id)?;
        Some(Profile {
            user_id: user.id,
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following: viewer.is_some_and(|v| self.follows.contains(&(v, id))),
        })
    }

    fn view(&self, article: &Article, viewer: Option<UserId>) -> ArticleView {
        ArticleView {
            article: article.clone(),
            author: self.profile(article.author_id, viewer),
            favorited: viewer.is_some_and(|v| self.favorites.contains(&(v, article.id))),
            favorites_count: self
                .favorites
                .iter()
                .filter(|(_, a)| *a == article.id)
                .count() as i64,
        }
    }

    fn username_of(&self, id: UserId) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.as_str())
    }

    /// Newest first, like `ORDER BY created_at DESC, id DESC`
    fn newest_first(&self, mut articles: Vec<&Article>) -> Vec<Article> {
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        articles.into_iter().cloned().collect()
    }
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

fn row_not_found() -> ConduitError {
    ConduitError::Database(sqlx::Error::RowNotFound)
}

/// Thread-safe in-memory store implementing every repository trait
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<State>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test may poison the lock; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next profile insert fail after the user insert succeeded
    pub fn fail_next_profile_insert(&self) {
        self.lock().fail_next_profile_insert = true;
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn profile_count(&self) -> usize {
        self.lock().profiles.len()
    }

    pub fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }

    pub fn favorite_count(&self) -> usize {
        self.lock().favorites.len()
    }

    /// Detach an article from its author row (simulates a dangling relation)
    pub fn orphan_article(&self, slug: &str) {
        let mut state = self.lock();
        if let Some(article) = state.articles.iter_mut().find(|a| a.slug.as_str() == slug) {
            article.author_id = UserId::new(i64::MAX);
        }
    }

    /// Remove a user's profile row while keeping the user row
    pub fn drop_profile(&self, username: &str) {
        let mut state = self.lock();
        let Some(id) = state
            .users
            .iter()
            .find(|u| u.username.as_str() == username)
            .map(|u| u.id)
        else {
            return;
        };
        state.profiles.retain(|p| *p != id);
    }
}

impl UserRepository for MemoryRepository {
    async fn create(&self, user: &NewUser) -> ConduitResult<User> {
        let mut state = self.lock();

        if state.users.iter().any(|u| u.username == user.username) {
            return Err(ConduitError::integrity("username", "has already been taken"));
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(ConduitError::integrity("email", "has already been taken"));
        }

        let id = UserId::new(state.next_id());
        let now = state.now();
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            bio: None,
            image: None,
            created_at: now,
            updated_at: now,
        };

        // Both rows or neither
        if state.fail_next_profile_insert {
            state.fail_next_profile_insert = false;
            return Err(ConduitError::integrity("body", "references a missing record"));
        }
        state.users.push(created.clone());
        state.profiles.push(id);

        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> ConduitResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> ConduitResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> ConduitResult<User> {
        let mut state = self.lock();

        if let Some(username) = &changes.username {
            if state.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(ConduitError::integrity("username", "has already been taken"));
            }
        }
        if let Some(email) = &changes.email {
            if state.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(ConduitError::integrity("email", "has already been taken"));
            }
        }

        let now = state.now();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(row_not_found)?;

        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(bio) = &changes.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(image) = &changes.image {
            user.image = Some(image.clone());
        }
        user.updated_at = now.max(user.created_at);

        Ok(user.clone())
    }
}

impl ProfileRepository for MemoryRepository {
    async fn find_by_username(
        &self,
        username: &UserName,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>> {
        let state = self.lock();
        let id = state
            .users
            .iter()
            .find(|u| &u.username == username)
            .map(|u| u.id);
        Ok(id.and_then(|id| state.profile(id, viewer)))
    }

    async fn find_by_user_id(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>> {
        Ok(self.lock().profile(id, viewer))
    }

    async fn follow(&self, follower: UserId, followed: UserId) -> ConduitResult<()> {
        let mut state = self.lock();
        if !state.follows.contains(&(follower, followed)) {
            state.follows.push((follower, followed));
        }
        Ok(())
    }

    async fn unfollow(&self, follower: UserId, followed: UserId) -> ConduitResult<()> {
        self.lock()
            .follows
            .retain(|pair| *pair != (follower, followed));
        Ok(())
    }
}

impl ArticleRepository for MemoryRepository {
    async fn create(&self, article: &NewArticle) -> ConduitResult<Article> {
        let mut state = self.lock();

        if state.articles.iter().any(|a| a.slug == article.slug) {
            return Err(ConduitError::integrity("slug", "has already been taken"));
        }

        let id = ArticleId::new(state.next_id());
        let now = state.now();
        let mut tag_list: Vec<String> = Vec::new();
        for tag in &article.tag_list {
            if !tag_list.contains(tag) {
                tag_list.push(tag.clone());
            }
        }

        let created = Article {
            id,
            slug: article.slug.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            body: article.body.clone(),
            tag_list,
            author_id: article.author_id,
            created_at: now,
            updated_at: now,
        };
        state.articles.push(created.clone());

        Ok(created)
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<ArticleView>> {
        let state = self.lock();
        Ok(state
            .articles
            .iter()
            .find(|a| &a.slug == slug)
            .map(|a| state.view(a, viewer)))
    }

    async fn list(
        &self,
        filter: &ArticleFilter,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<ArticleView>> {
        let state = self.lock();

        let matching: Vec<&Article> = state
            .articles
            .iter()
            .filter(|a| {
                filter
                    .tag
                    .as_ref()
                    .is_none_or(|tag| a.tag_list.iter().any(|t| t == tag))
            })
            .filter(|a| {
                filter
                    .author
                    .as_deref()
                    .is_none_or(|author| state.username_of(a.author_id) == Some(author))
            })
            .filter(|a| {
                filter.favorited_by.as_deref().is_none_or(|name| {
                    state
                        .favorites
                        .iter()
                        .any(|(u, art)| *art == a.id && state.username_of(*u) == Some(name))
                })
            })
            .collect();

        let ordered = state.newest_first(matching);
        Ok(page(ordered, filter.limit, filter.offset)
            .iter()
            .map(|a| state.view(a, viewer))
            .collect())
    }

    async fn feed(
        &self,
        follower: UserId,
        limit: i64,
        offset: i64,
    ) -> ConduitResult<Vec<ArticleView>> {
        let state = self.lock();

        let matching: Vec<&Article> = state
            .articles
            .iter()
            .filter(|a| state.follows.contains(&(follower, a.author_id)))
            .collect();

        let ordered = state.newest_first(matching);
        Ok(page(ordered, limit, offset)
            .iter()
            .map(|a| state.view(a, Some(follower)))
            .collect())
    }

    async fn update(&self, id: ArticleId, changes: &ArticleChanges) -> ConduitResult<Article> {
        let mut state = self.lock();

        if let Some(slug) = &changes.slug {
            if state.articles.iter().any(|a| a.id != id && &a.slug == slug) {
                return Err(ConduitError::integrity("slug", "has already been taken"));
            }
        }

        let now = state.now();
        let article = state
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(row_not_found)?;

        if let Some(slug) = &changes.slug {
            article.slug = slug.clone();
        }
        if let Some(title) = &changes.title {
            article.title = title.clone();
        }
        if let Some(description) = &changes.description {
            article.description = description.clone();
        }
        if let Some(body) = &changes.body {
            article.body = body.clone();
        }
        article.updated_at = now.max(article.created_at);

        Ok(article.clone())
    }

    async fn delete(&self, id: ArticleId) -> ConduitResult<()> {
        let mut state = self.lock();
        state.articles.retain(|a| a.id != id);
        // ON DELETE CASCADE
        state.favorites.retain(|(_, a)| *a != id);
        state.comments.retain(|c| c.article_id != id);
        Ok(())
    }

    async fn favorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()> {
        let mut state = self.lock();
        if !state.articles.iter().any(|a| a.id == article) {
            return Err(ConduitError::integrity("body", "references a missing record"));
        }
        if !state.favorites.contains(&(user, article)) {
            state.favorites.push((user, article));
        }
        Ok(())
    }

    async fn unfavorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()> {
        self.lock()
            .favorites
            .retain(|pair| *pair != (user, article));
        Ok(())
    }
}

impl CommentRepository for MemoryRepository {
    async fn create(&self, comment: &NewComment) -> ConduitResult<Comment> {
        let mut state = self.lock();

        if !state.articles.iter().any(|a| a.id == comment.article_id) {
            return Err(ConduitError::integrity("body", "references a missing record"));
        }

        let id = CommentId::new(state.next_id());
        let now = state.now();
        let created = Comment {
            id,
            body: comment.body.clone(),
            article_id: comment.article_id,
            author_id: comment.author_id,
            created_at: now,
            updated_at: now,
        };
        state.comments.push(created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: CommentId) -> ConduitResult<Option<Comment>> {
        Ok(self.lock().comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_for_article(
        &self,
        article: ArticleId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<CommentView>> {
        let state = self.lock();

        let mut comments: Vec<&Comment> = state
            .comments
            .iter()
            .filter(|c| c.article_id == article)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                comment: c.clone(),
                author: state.profile(c.author_id, viewer),
            })
            .collect())
    }

    async fn delete(&self, id: CommentId) -> ConduitResult<()> {
        self.lock().comments.retain(|c| c.id != id);
        Ok(())
    }
}

impl TagRepository for MemoryRepository {
    async fn list(&self) -> ConduitResult<Vec<String>> {
        let state = self.lock();
        let mut tags: Vec<String> = state
            .articles
            .iter()
            .flat_map(|a| a.tag_list.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }
}
