use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::entities::Post;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        board: &str,
        title: &str,
        content: &str,
        author_id: Uuid,
        author_name: &str,
        images: Vec<String>,
    ) -> Result<Post>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;
    /// Newest first. `board = None` means all boards.
    async fn list<'a>(&self, board: Option<&'a str>, limit: i64, offset: i64)
    -> Result<Vec<Post>>;
    async fn count<'a>(&self, board: Option<&'a str>) -> Result<i64>;
    /// Deletes the post and its comments.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> Result<Vec<Post>>;
    async fn count_by_author(&self, author_id: Uuid) -> Result<i64>;
}

#[derive(Clone)]
pub struct PostRepository {
    pool: Pool<Postgres>,
}

impl PostRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepositoryTrait for PostRepository {
    async fn create(
        &self,
        board: &str,
        title: &str,
        content: &str,
        author_id: Uuid,
        author_name: &str,
        images: Vec<String>,
    ) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (board, title, content, author_id, author_name, images)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, board, title, content, author_id, author_name, images,
                      comment_count, created_at
            "#,
        )
        .bind(board)
        .bind(title)
        .bind(content)
        .bind(author_id)
        .bind(author_name)
        .bind(images)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, board, title, content, author_id, author_name, images,
                   comment_count, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list<'a>(
        &self,
        board: Option<&'a str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, board, title, content, author_id, author_name, images,
                   comment_count, created_at
            FROM posts
            WHERE ($1::text IS NULL OR board = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(board)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count<'a>(&self, board: Option<&'a str>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE ($1::text IS NULL OR board = $1)
            "#,
        )
        .bind(board)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_author(&self, author_id: Uuid, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, board, title, content, author_id, author_name, images,
                   comment_count, created_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
