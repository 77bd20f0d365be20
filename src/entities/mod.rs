use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// --- Tables ---

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub pw_hash: String,
    /// "user" or "admin"; admins may delete any post or comment.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub board: String,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    /// Denormalized at creation time; a later username change does not
    /// rewrite history.
    pub author_name: String,
    pub images: Vec<String>,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub images: Vec<String>,
    pub reply_to_author_id: Option<Uuid>,
    pub reply_to_author_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub author: String,
    pub image: String,
    pub description: String,
    /// Normalized by the metadata resolver; free-form when caller-supplied.
    pub publish_time: String,
    pub source: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub source: String,
    pub author: String,
    pub publish_time: String,
    /// Curation order; lower sorts first.
    pub sort_order: i32,
    pub visible: bool,
    pub added_at: DateTime<Utc>,
}
