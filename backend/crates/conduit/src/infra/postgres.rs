//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, CommentId, UserId};
use platform::password::HashedPassword;
use sqlx::{PgConnection, PgPool};

use crate::domain::entity::{
    Article, ArticleChanges, ArticleFilter, ArticleView, Comment, CommentView, NewArticle,
    NewComment, NewUser, Profile, User, UserChanges,
};
use crate::domain::repository::{
    ArticleRepository, CommentRepository, ProfileRepository, TagRepository, UserRepository,
};
use crate::domain::value_object::{Email, Slug, UserName};
use crate::error::{ConduitError, ConduitResult};

/// PostgreSQL-backed Conduit repository
#[derive(Clone)]
pub struct PgConduitRepository {
    pool: PgPool,
}

impl PgConduitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

const USER_COLUMNS: &str = "id, username, email, password_hash, bio, image, created_at, updated_at";

impl UserRepository for PgConduitRepository {
    async fn create(&self, user: &NewUser) -> ConduitResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_user()
    }

    async fn find_by_id(&self, id: UserId) -> ConduitResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> ConduitResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> ConduitResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                bio = COALESCE($5, bio),
                image = COALESCE($6, image),
                updated_at = GREATEST(now(), created_at)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.value())
        .bind(changes.username.as_ref().map(UserName::as_str))
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.password_hash.as_ref().map(HashedPassword::as_phc_string))
        .bind(changes.bio.as_deref())
        .bind(changes.image.as_deref())
        .fetch_one(&self.pool)
        .await?;

        row.into_user()
    }
}

// ============================================================================
// Profile Repository Implementation
// ============================================================================

impl ProfileRepository for PgConduitRepository {
    async fn find_by_username(
        &self,
        username: &UserName,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                u.bio,
                u.image,
                EXISTS (
                    SELECT 1 FROM follows f
                    WHERE f.followed_id = u.id AND f.follower_id = $2
                ) AS following
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE u.username = $1
            "#,
        )
        .bind(username.as_str())
        .bind(viewer.map(|v| v.value()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn find_by_user_id(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                u.bio,
                u.image,
                EXISTS (
                    SELECT 1 FROM follows f
                    WHERE f.followed_id = u.id AND f.follower_id = $2
                ) AS following
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(id.value())
        .bind(viewer.map(|v| v.value()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn follow(&self, follower: UserId, followed: UserId) -> ConduitResult<()> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower.value())
        .bind(followed.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unfollow(&self, follower: UserId, followed: UserId) -> ConduitResult<()> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower.value())
            .bind(followed.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Article Repository Implementation
// ============================================================================

/// Article columns plus the fields computed relative to the viewer (`$1`)
///
/// The author is LEFT JOINed so a dangling reference surfaces as a
/// missing author instead of a missing article. An author resolves only
/// with both its `users` and `profiles` rows, like `find_by_user_id`.
const ARTICLE_VIEW_SELECT: &str = r#"
    SELECT
        a.id,
        a.slug,
        a.title,
        a.description,
        a.body,
        a.author_id,
        a.created_at,
        a.updated_at,
        COALESCE(
            (
                SELECT array_agg(t.name ORDER BY at.position)
                FROM article_tags at
                JOIN tags t ON t.id = at.tag_id
                WHERE at.article_id = a.id
            ),
            '{}'::text[]
        ) AS tag_list,
        (SELECT COUNT(*) FROM favorites f WHERE f.article_id = a.id) AS favorites_count,
        EXISTS (
            SELECT 1 FROM favorites f
            WHERE f.article_id = a.id AND f.user_id = $1
        ) AS favorited,
        u.username AS author_username,
        u.bio AS author_bio,
        u.image AS author_image,
        EXISTS (
            SELECT 1 FROM follows fo
            WHERE fo.followed_id = a.author_id AND fo.follower_id = $1
        ) AS author_following
    FROM articles a
    LEFT JOIN (users u JOIN profiles p ON p.user_id = u.id) ON u.id = a.author_id
"#;

const ARTICLE_COLUMNS: &str =
    "id, slug, title, description, body, author_id, created_at, updated_at";

impl PgConduitRepository {
    /// Tag names of an article in stored order
    async fn fetch_tags(conn: &mut PgConnection, article_id: i64) -> ConduitResult<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.name
            FROM article_tags at
            JOIN tags t ON t.id = at.tag_id
            WHERE at.article_id = $1
            ORDER BY at.position
            "#,
        )
        .bind(article_id)
        .fetch_all(conn)
        .await?;

        Ok(tags)
    }
}

impl ArticleRepository for PgConduitRepository {
    async fn create(&self, article: &NewArticle) -> ConduitResult<Article> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            INSERT INTO articles (slug, title, description, body, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(article.slug.as_str())
        .bind(&article.title)
        .bind(&article.description)
        .bind(&article.body)
        .bind(article.author_id.value())
        .fetch_one(&mut *tx)
        .await?;

        for (position, name) in article.tag_list.iter().enumerate() {
            // DO UPDATE (not DO NOTHING) so RETURNING yields the existing id
            let tag_id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO tags (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO article_tags (article_id, tag_id, position)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(row.id)
            .bind(tag_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        let tag_list = Self::fetch_tags(&mut tx, row.id).await?;

        tx.commit().await?;

        Ok(row.into_article(tag_list))
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
        viewer: Option<UserId>,
    ) -> ConduitResult<Option<ArticleView>> {
        let row = sqlx::query_as::<_, ArticleViewRow>(&format!(
            "{ARTICLE_VIEW_SELECT} WHERE a.slug = $2"
        ))
        .bind(viewer.map(|v| v.value()))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ArticleViewRow::into_view))
    }

    async fn list(
        &self,
        filter: &ArticleFilter,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<ArticleView>> {
        let rows = sqlx::query_as::<_, ArticleViewRow>(&format!(
            r#"
            {ARTICLE_VIEW_SELECT}
            WHERE ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM article_tags at
                    JOIN tags t ON t.id = at.tag_id
                    WHERE at.article_id = a.id AND t.name = $2
                ))
              AND ($3::text IS NULL OR u.username = $3)
              AND ($4::text IS NULL OR EXISTS (
                    SELECT 1 FROM favorites f
                    JOIN users fu ON fu.id = f.user_id
                    WHERE f.article_id = a.id AND fu.username = $4
                ))
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(viewer.map(|v| v.value()))
        .bind(filter.tag.as_deref())
        .bind(filter.author.as_deref())
        .bind(filter.favorited_by.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleViewRow::into_view).collect())
    }

    async fn feed(
        &self,
        follower: UserId,
        limit: i64,
        offset: i64,
    ) -> ConduitResult<Vec<ArticleView>> {
        let rows = sqlx::query_as::<_, ArticleViewRow>(&format!(
            r#"
            {ARTICLE_VIEW_SELECT}
            WHERE a.author_id IN (
                SELECT followed_id FROM follows WHERE follower_id = $1
            )
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(follower.value())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleViewRow::into_view).collect())
    }

    async fn update(&self, id: ArticleId, changes: &ArticleChanges) -> ConduitResult<Article> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            UPDATE articles SET
                slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                body = COALESCE($5, body),
                updated_at = GREATEST(now(), created_at)
            WHERE id = $1
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(id.value())
        .bind(changes.slug.as_ref().map(Slug::as_str))
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.body.as_deref())
        .fetch_one(&mut *conn)
        .await?;

        let tag_list = Self::fetch_tags(&mut conn, row.id).await?;

        Ok(row.into_article(tag_list))
    }

    async fn delete(&self, id: ArticleId) -> ConduitResult<()> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn favorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, article_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.value())
        .bind(article.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unfavorite(&self, user: UserId, article: ArticleId) -> ConduitResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND article_id = $2")
            .bind(user.value())
            .bind(article.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgConduitRepository {
    async fn create(&self, comment: &NewComment) -> ConduitResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (body, article_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, body, article_id, author_id, created_at, updated_at
            "#,
        )
        .bind(&comment.body)
        .bind(comment.article_id.value())
        .bind(comment.author_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    async fn find_by_id(&self, id: CommentId) -> ConduitResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, body, article_id, author_id, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_for_article(
        &self,
        article: ArticleId,
        viewer: Option<UserId>,
    ) -> ConduitResult<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT
                c.id,
                c.body,
                c.article_id,
                c.author_id,
                c.created_at,
                c.updated_at,
                u.username AS author_username,
                u.bio AS author_bio,
                u.image AS author_image,
                EXISTS (
                    SELECT 1 FROM follows fo
                    WHERE fo.followed_id = c.author_id AND fo.follower_id = $2
                ) AS author_following
            FROM comments c
            LEFT JOIN (users u JOIN profiles p ON p.user_id = u.id) ON u.id = c.author_id
            WHERE c.article_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(article.value())
        .bind(viewer.map(|v| v.value()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentViewRow::into_view).collect())
    }

    async fn delete(&self, id: CommentId) -> ConduitResult<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Tag Repository Implementation
// ============================================================================

impl TagRepository for PgConduitRepository {
    async fn list(&self) -> ConduitResult<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT t.name
            FROM tags t
            JOIN article_tags at ON at.tag_id = t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    bio: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> ConduitResult<User> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash).map_err(|e| {
            ConduitError::Internal(format!("Stored password hash for user {}: {}", self.id, e))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash,
            bio: self.bio,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    username: String,
    bio: Option<String>,
    image: Option<String>,
    following: bool,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            user_id: UserId::new(self.user_id),
            username: UserName::from_db(self.username),
            bio: self.bio,
            image: self.image,
            following: self.following,
        }
    }
}

/// Author columns of a LEFT JOIN; `username` is NULL when unresolved
fn author_profile(
    author_id: i64,
    username: Option<String>,
    bio: Option<String>,
    image: Option<String>,
    following: bool,
) -> Option<Profile> {
    username.map(|username| Profile {
        user_id: UserId::new(author_id),
        username: UserName::from_db(username),
        bio,
        image,
        following,
    })
}

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    slug: String,
    title: String,
    description: String,
    body: String,
    author_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ArticleRow {
    fn into_article(self, tag_list: Vec<String>) -> Article {
        Article {
            id: ArticleId::new(self.id),
            slug: Slug::from_db(self.slug),
            title: self.title,
            description: self.description,
            body: self.body,
            tag_list,
            author_id: UserId::new(self.author_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArticleViewRow {
    #[sqlx(flatten)]
    article: ArticleRow,
    tag_list: Vec<String>,
    favorites_count: i64,
    favorited: bool,
    author_username: Option<String>,
    author_bio: Option<String>,
    author_image: Option<String>,
    author_following: bool,
}

impl ArticleViewRow {
    fn into_view(self) -> ArticleView {
        let author = author_profile(
            self.article.author_id,
            self.author_username,
            self.author_bio,
            self.author_image,
            self.author_following,
        );

        ArticleView {
            article: self.article.into_article(self.tag_list),
            author,
            favorited: self.favorited,
            favorites_count: self.favorites_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    body: String,
    article_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            body: self.body,
            article_id: ArticleId::new(self.article_id),
            author_id: UserId::new(self.author_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_username: Option<String>,
    author_bio: Option<String>,
    author_image: Option<String>,
    author_following: bool,
}

impl CommentViewRow {
    fn into_view(self) -> CommentView {
        let author = author_profile(
            self.comment.author_id,
            self.author_username,
            self.author_bio,
            self.author_image,
            self.author_following,
        );

        CommentView {
            comment: self.comment.into_comment(),
            author,
        }
    }
}
