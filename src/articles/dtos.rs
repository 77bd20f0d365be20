use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Article;

fn default_empty() -> String {
    String::new()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddArticleRequest {
    #[serde(default = "default_empty")]
    pub password: String,
    #[serde(default = "default_empty")]
    pub url: String,
    /// Caller-supplied fields take precedence over whatever extraction finds.
    #[serde(default = "default_empty")]
    pub title: String,
    #[serde(default = "default_empty")]
    pub author: String,
    #[serde(default = "default_empty")]
    pub image: String,
    #[serde(default = "default_empty")]
    pub description: String,
    #[serde(default = "default_empty")]
    pub publish_time: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminActionRequest {
    #[serde(default = "default_empty")]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub author: String,
    pub image: String,
    pub description: String,
    pub publish_time: String,
    pub source: String,
    pub added_at: DateTime<Utc>,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            url: article.url,
            title: article.title,
            author: article.author,
            image: article.image,
            description: article.description,
            publish_time: article.publish_time,
            source: article.source,
            added_at: article.added_at,
        }
    }
}
