use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::entities::Comment;

/// A comment joined with the title of the post it belongs to, for the
/// per-user activity listing.
#[derive(Debug, Clone, FromRow)]
pub struct AuthoredComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub images: Vec<String>,
    pub reply_to_author_id: Option<Uuid>,
    pub reply_to_author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub post_title: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepositoryTrait: Send + Sync {
    /// Inserts the comment and bumps the post's comment count in one
    /// transaction.
    async fn create(
        &self,
        post_id: Uuid,
        content: &str,
        author_id: Uuid,
        author_name: &str,
        images: Vec<String>,
        reply_to_author_id: Option<Uuid>,
        reply_to_author_name: Option<String>,
    ) -> Result<Comment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Oldest first, the reading order of a thread.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;
    /// Deletes the comment and decrements the post's comment count.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> Result<Vec<AuthoredComment>>;
    async fn count_by_author(&self, author_id: Uuid) -> Result<i64>;
}

#[derive(Clone)]
pub struct CommentRepository {
    pool: Pool<Postgres>,
}

impl CommentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepositoryTrait for CommentRepository {
    async fn create(
        &self,
        post_id: Uuid,
        content: &str,
        author_id: Uuid,
        author_name: &str,
        images: Vec<String>,
        reply_to_author_id: Option<Uuid>,
        reply_to_author_name: Option<String>,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments
                (post_id, content, author_id, author_name, images,
                 reply_to_author_id, reply_to_author_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, post_id, content, author_id, author_name, images,
                      reply_to_author_id, reply_to_author_name, created_at
            "#,
        )
        .bind(post_id)
        .bind(content)
        .bind(author_id)
        .bind(author_name)
        .bind(images)
        .bind(reply_to_author_id)
        .bind(reply_to_author_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, content, author_id, author_name, images,
                   reply_to_author_id, reply_to_author_name, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, content, author_id, author_name, images,
                   reply_to_author_id, reply_to_author_name, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let post_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM comments WHERE id = $1 RETURNING post_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(post_id) = post_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query(
            "UPDATE posts SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> Result<Vec<AuthoredComment>> {
        let comments = sqlx::query_as::<_, AuthoredComment>(
            r#"
            SELECT c.id, c.post_id, c.content, c.author_id, c.author_name, c.images,
                   c.reply_to_author_id, c.reply_to_author_name, c.created_at,
                   p.title AS post_title
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE c.author_id = $1
            ORDER BY c.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
