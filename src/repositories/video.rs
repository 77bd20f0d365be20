use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::entities::Video;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepositoryTrait: Send + Sync {
    async fn create(
        &self,
        url: &str,
        title: &str,
        description: &str,
        cover_image: &str,
        source: &str,
        author: &str,
        publish_time: &str,
    ) -> Result<Video>;
    /// Visible videos only, curation order first, then newest.
    async fn list_visible(&self) -> Result<Vec<Video>>;
    /// Everything, for the curation view.
    async fn list_all(&self) -> Result<Vec<Video>>;
    async fn find_by_url(&self, url: &str) -> Result<Option<Video>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn set_sort_order(&self, id: Uuid, sort_order: i32) -> Result<bool>;
    async fn set_visibility(&self, id: Uuid, visible: bool) -> Result<bool>;
}

#[derive(Clone)]
pub struct VideoRepository {
    pool: Pool<Postgres>,
}

impl VideoRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepositoryTrait for VideoRepository {
    async fn create(
        &self,
        url: &str,
        title: &str,
        description: &str,
        cover_image: &str,
        source: &str,
        author: &str,
        publish_time: &str,
    ) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (url, title, description, cover_image, source, author, publish_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, url, title, description, cover_image, source, author, publish_time,
                      sort_order, visible, added_at
            "#,
        )
        .bind(url)
        .bind(title)
        .bind(description)
        .bind(cover_image)
        .bind(source)
        .bind(author)
        .bind(publish_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    async fn list_visible(&self) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, url, title, description, cover_image, source, author, publish_time,
                   sort_order, visible, added_at
            FROM videos
            WHERE visible
            ORDER BY sort_order ASC, added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn list_all(&self) -> Result<Vec<Video>> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, url, title, description, cover_image, source, author, publish_time,
                   sort_order, visible, added_at
            FROM videos
            ORDER BY sort_order ASC, added_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, url, title, description, cover_image, source, author, publish_time,
                   sort_order, visible, added_at
            FROM videos
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_sort_order(&self, id: Uuid, sort_order: i32) -> Result<bool> {
        let result = sqlx::query("UPDATE videos SET sort_order = $1 WHERE id = $2")
            .bind(sort_order)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_visibility(&self, id: Uuid, visible: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE videos SET visible = $1 WHERE id = $2")
            .bind(visible)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
