//! Comment Use Case

use std::sync::Arc;

use kernel::id::{CommentId, UserId};

use crate::application::identity::Identity;
use crate::application::required;
use crate::domain::entity::{ArticleView, CommentView, NewComment};
use crate::domain::repository::{ArticleRepository, CommentRepository, ProfileRepository};
use crate::domain::value_object::Slug;
use crate::error::{ConduitError, ConduitResult};

/// Comment use case
pub struct CommentUseCase<A, C, P>
where
    A: ArticleRepository,
    C: CommentRepository,
    P: ProfileRepository,
{
    article_repo: Arc<A>,
    comment_repo: Arc<C>,
    profile_repo: Arc<P>,
}

impl<A, C, P> CommentUseCase<A, C, P>
where
    A: ArticleRepository,
    C: CommentRepository,
    P: ProfileRepository,
{
    pub fn new(article_repo: Arc<A>, comment_repo: Arc<C>, profile_repo: Arc<P>) -> Self {
        Self {
            article_repo,
            comment_repo,
            profile_repo,
        }
    }

    pub async fn add(
        &self,
        identity: &Identity,
        slug: &str,
        body: String,
    ) -> ConduitResult<CommentView> {
        let body = required("body", body)?;
        let article = self.find_article(slug, Some(identity.user_id)).await?;

        let comment = self
            .comment_repo
            .create(&NewComment {
                body,
                article_id: article.article.id,
                author_id: identity.user_id,
            })
            .await?;

        tracing::info!(
            comment_id = %comment.id,
            article_id = %comment.article_id,
            "Comment added"
        );

        let author = self
            .profile_repo
            .find_by_user_id(identity.user_id, Some(identity.user_id))
            .await?;

        Ok(CommentView { comment, author })
    }

    pub async fn list(
        &self,
        viewer: Option<&Identity>,
        slug: &str,
    ) -> ConduitResult<Vec<CommentView>> {
        let viewer = viewer.map(|i| i.user_id);
        let article = self.find_article(slug, viewer).await?;
        self.comment_repo
            .list_for_article(article.article.id, viewer)
            .await
    }

    /// Only the comment's author may delete it
    pub async fn delete(
        &self,
        identity: &Identity,
        slug: &str,
        comment_id: CommentId,
    ) -> ConduitResult<()> {
        let article = self.find_article(slug, Some(identity.user_id)).await?;

        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.article_id == article.article.id)
            .ok_or(ConduitError::NotFound("comment"))?;

        if comment.author_id != identity.user_id {
            return Err(ConduitError::Forbidden);
        }

        self.comment_repo.delete(comment.id).await?;

        tracing::info!(comment_id = %comment.id, "Comment deleted");

        Ok(())
    }

    async fn find_article(&self, slug: &str, viewer: Option<UserId>) -> ConduitResult<ArticleView> {
        self.article_repo
            .find_by_slug(&Slug::from_db(slug), viewer)
            .await?
            .ok_or(ConduitError::NotFound("article"))
    }
}
