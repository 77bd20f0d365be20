use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::{Comment, Post},
    repositories::comment::AuthoredComment,
};

pub const PAGE_SIZE: i64 = 20;
/// Cap for the per-user activity listings.
pub const USER_ACTIVITY_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub board: Option<String>,
    pub page: Option<i64>,
}

impl ListPostsQuery {
    /// `board=all` (or absent) means no filter.
    pub fn board_filter(&self) -> Option<&str> {
        match self.board.as_deref() {
            None | Some("all") | Some("") => None,
            Some(board) => Some(board),
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub board: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.board.trim().is_empty()
            || self.title.trim().is_empty()
            || self.content.trim().is_empty()
        {
            return Err("Board, title and content are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub reply_to_author_id: Option<Uuid>,
    pub reply_to_author_name: Option<String>,
}

impl CreateCommentRequest {
    /// A comment needs text or at least one image.
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() && self.images.is_empty() {
            return Err("Comment content or images are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub board: String,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub images: Vec<String>,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            board: post.board,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_name: post.author_name,
            images: post.images,
            comment_count: post.comment_count,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
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

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            content: comment.content,
            author_id: comment.author_id,
            author_name: comment.author_name,
            images: comment.images,
            reply_to_author_id: comment.reply_to_author_id,
            reply_to_author_name: comment.reply_to_author_name,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredCommentView {
    #[serde(flatten)]
    pub comment: CommentView,
    pub post_title: String,
}

impl From<AuthoredComment> for AuthoredCommentView {
    fn from(row: AuthoredComment) -> Self {
        Self {
            comment: CommentView {
                id: row.id,
                post_id: row.post_id,
                content: row.content,
                author_id: row.author_id,
                author_name: row.author_name,
                images: row.images,
                reply_to_author_id: row.reply_to_author_id,
                reply_to_author_name: row.reply_to_author_name,
                created_at: row.created_at,
            },
            post_title: row.post_title,
        }
    }
}
