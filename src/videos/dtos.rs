use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Video;

fn default_empty() -> String {
    String::new()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoRequest {
    #[serde(default = "default_empty")]
    pub password: String,
    /// May be raw share text copied out of an app, not a bare URL.
    #[serde(default = "default_empty")]
    pub url: String,
    #[serde(default = "default_empty")]
    pub title: String,
    #[serde(default = "default_empty")]
    pub description: String,
    #[serde(default = "default_empty")]
    pub cover_image: String,
    #[serde(default = "default_empty")]
    pub author: String,
    #[serde(default = "default_empty")]
    pub publish_time: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderEntry {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default = "default_empty")]
    pub password: String,
    pub orders: Vec<OrderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    #[serde(default = "default_empty")]
    pub password: String,
    pub visible: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub source: String,
    pub author: String,
    pub publish_time: String,
    pub sort_order: i32,
    pub visible: bool,
    pub added_at: DateTime<Utc>,
}

impl From<Video> for VideoView {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            url: video.url,
            title: video.title,
            description: video.description,
            cover_image: video.cover_image,
            source: video.source,
            author: video.author,
            publish_time: video.publish_time,
            sort_order: video.sort_order,
            visible: video.visible,
            added_at: video.added_at,
        }
    }
}
