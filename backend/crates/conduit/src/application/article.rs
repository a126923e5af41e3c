//! Article Use Case
//!
//! Article CRUD, listing, feed and favorites. Writes are owner-only.

use std::sync::Arc;

use kernel::error::fields::FieldErrors;
use kernel::id::UserId;

use crate::application::identity::Identity;
use crate::application::{check, finish, required};
use crate::domain::entity::{ArticleChanges, ArticleFilter, ArticleView, NewArticle};
use crate::domain::repository::{ArticleRepository, ProfileRepository};
use crate::domain::value_object::Slug;
use crate::error::{ConduitError, ConduitResult};

/// Create article input
pub struct CreateArticleInput {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

/// Update article input; `None` leaves a field unchanged
#[derive(Default)]
pub struct UpdateArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// Article use case
pub struct ArticleUseCase<A, P>
where
    A: ArticleRepository,
    P: ProfileRepository,
{
    article_repo: Arc<A>,
    profile_repo: Arc<P>,
}

impl<A, P> ArticleUseCase<A, P>
where
    A: ArticleRepository,
    P: ProfileRepository,
{
    pub fn new(article_repo: Arc<A>, profile_repo: Arc<P>) -> Self {
        Self {
            article_repo,
            profile_repo,
        }
    }

    pub async fn create(
        &self,
        identity: &Identity,
        input: CreateArticleInput,
    ) -> ConduitResult<ArticleView> {
        let mut errors = FieldErrors::new();
        let title = check(&mut errors, required("title", input.title))?;
        let description = check(&mut errors, required("description", input.description))?;
        let body = check(&mut errors, required("body", input.body))?;
        let tag_list = check(&mut errors, normalize_tags(input.tag_list))?;
        let slug = match &title {
            Some(title) => check(&mut errors, Slug::from_title(title))?,
            None => None,
        };
        finish(errors)?;

        let (Some(title), Some(description), Some(body), Some(tag_list), Some(slug)) =
            (title, description, body, tag_list, slug)
        else {
            return Err(ConduitError::Internal("validation state mismatch".into()));
        };

        let new_article = NewArticle {
            slug,
            title,
            description,
            body,
            tag_list,
            author_id: identity.user_id,
        };

        let article = self.article_repo.create(&new_article).await?;

        tracing::info!(
            article_id = %article.id,
            slug = %article.slug,
            author_id = %article.author_id,
            "Article created"
        );

        let author = self
            .profile_repo
            .find_by_user_id(identity.user_id, Some(identity.user_id))
            .await?;

        Ok(ArticleView {
            article,
            author,
            favorited: false,
            favorites_count: 0,
        })
    }

    pub async fn get(&self, viewer: Option<&Identity>, slug: &str) -> ConduitResult<ArticleView> {
        self.find(slug, viewer.map(|i| i.user_id)).await
    }

    pub async fn list(
        &self,
        viewer: Option<&Identity>,
        filter: ArticleFilter,
    ) -> ConduitResult<Vec<ArticleView>> {
        self.article_repo
            .list(&filter, viewer.map(|i| i.user_id))
            .await
    }

    pub async fn feed(
        &self,
        identity: &Identity,
        limit: i64,
        offset: i64,
    ) -> ConduitResult<Vec<ArticleView>> {
        self.article_repo
            .feed(identity.user_id, limit, offset)
            .await
    }

    pub async fn update(
        &self,
        identity: &Identity,
        slug: &str,
        input: UpdateArticleInput,
    ) -> ConduitResult<ArticleView> {
        let current = self.find_owned(identity, slug).await?;

        let mut errors = FieldErrors::new();
        let mut changes = ArticleChanges::default();
        if let Some(title) = input.title {
            let title = check(&mut errors, required("title", title))?;
            if let Some(title) = title.filter(|t| *t != current.article.title) {
                changes.slug = check(&mut errors, Slug::from_title(&title))?;
                changes.title = Some(title);
            }
        }
        if let Some(description) = input.description {
            changes.description = check(&mut errors, required("description", description))?;
        }
        if let Some(body) = input.body {
            changes.body = check(&mut errors, required("body", body))?;
        }
        finish(errors)?;

        let article = self
            .article_repo
            .update(current.article.id, &changes)
            .await?;

        tracing::info!(
            article_id = %article.id,
            slug = %article.slug,
            "Article updated"
        );

        self.find(article.slug.as_str(), Some(identity.user_id))
            .await
    }

    pub async fn delete(&self, identity: &Identity, slug: &str) -> ConduitResult<()> {
        let current = self.find_owned(identity, slug).await?;

        self.article_repo.delete(current.article.id).await?;

        tracing::info!(
            article_id = %current.article.id,
            slug = %current.article.slug,
            "Article deleted"
        );

        Ok(())
    }

    pub async fn favorite(&self, identity: &Identity, slug: &str) -> ConduitResult<ArticleView> {
        let current = self.find(slug, Some(identity.user_id)).await?;
        if !current.favorited {
            self.article_repo
                .favorite(identity.user_id, current.article.id)
                .await?;
        }
        self.find(slug, Some(identity.user_id)).await
    }

    pub async fn unfavorite(&self, identity: &Identity, slug: &str) -> ConduitResult<ArticleView> {
        let current = self.find(slug, Some(identity.user_id)).await?;
        if current.favorited {
            self.article_repo
                .unfavorite(identity.user_id, current.article.id)
                .await?;
        }
        self.find(slug, Some(identity.user_id)).await
    }

    async fn find(&self, slug: &str, viewer: Option<UserId>) -> ConduitResult<ArticleView> {
        self.article_repo
            .find_by_slug(&Slug::from_db(slug), viewer)
            .await?
            .ok_or(ConduitError::NotFound("article"))
    }

    /// Load an article the identity may modify
    async fn find_owned(&self, identity: &Identity, slug: &str) -> ConduitResult<ArticleView> {
        let view = self.find(slug, Some(identity.user_id)).await?;
        if view.article.author_id != identity.user_id {
            return Err(ConduitError::Forbidden);
        }
        Ok(view)
    }
}

/// Trim tag names and drop repeats, keeping first-seen order
fn normalize_tags(tags: Vec<String>) -> ConduitResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ConduitError::invalid("tagList", "can't contain blank tags"));
        }
        if !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_keeps_order() {
        let tags = vec![" rust ".into(), "axum".into(), "rust".into(), "sqlx".into()];
        assert_eq!(normalize_tags(tags).unwrap(), vec!["rust", "axum", "sqlx"]);
    }

    #[test]
    fn test_normalize_tags_rejects_blank() {
        assert!(normalize_tags(vec!["ok".into(), "  ".into()]).is_err());
    }
}
