use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::entities::Article;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        url: &str,
        title: &str,
        author: &str,
        image: &str,
        description: &str,
        publish_time: &str,
        source: &str,
    ) -> Result<Article>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Article>>;
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn delete_by_url(&self, url: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct ArticleRepository {
    pool: Pool<Postgres>,
}

impl ArticleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepositoryTrait for ArticleRepository {
    async fn create(
        &self,
        url: &str,
        title: &str,
        author: &str,
        image: &str,
        description: &str,
        publish_time: &str,
        source: &str,
    ) -> Result<Article> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (url, title, author, image, description, publish_time, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, url, title, author, image, description, publish_time, source, added_at
            "#,
        )
        .bind(url)
        .bind(title)
        .bind(author)
        .bind(image)
        .bind(description)
        .bind(publish_time)
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        Ok(article)
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, url, title, author, image, description, publish_time, source, added_at
            FROM articles
            ORDER BY added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, url, title, author, image, description, publish_time, source, added_at
            FROM articles
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_url(&self, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE url = $1")
            .bind(url)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
