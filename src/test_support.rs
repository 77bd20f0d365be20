//! Shared fixtures for handler unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    app_state::AppState,
    config::Config,
    fetcher::{Charset, FetchError, HttpFetcher, PageFetcher, PageResponse},
    repositories::{
        article::MockArticleRepositoryTrait, comment::MockCommentRepositoryTrait,
        post::MockPostRepositoryTrait, user::MockUserRepositoryTrait,
        video::MockVideoRepositoryTrait,
    },
    uploads::store::MockObjectStore,
};

/// Fetcher whose every fetch fails; exercises the best-effort paths.
pub struct FailingFetcher;

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch_page(&self, _url: &str) -> Result<PageResponse, FetchError> {
        Err(FetchError::Connect("stubbed out".to_string()))
    }

    async fn resolve_final_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Fetcher that serves one fixed HTML document for any URL.
pub struct StaticFetcher {
    pub html: String,
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError> {
        Ok(PageResponse {
            url_final: url::Url::parse(url)?,
            status: reqwest::StatusCode::OK,
            text: self.html.clone(),
            charset: Charset::Utf8,
            fetched_at: Utc::now(),
        })
    }

    async fn resolve_final_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Dummy pool; handlers under test never touch it directly.
pub fn test_pool() -> Pool<Postgres> {
    Pool::<Postgres>::connect_lazy("postgresql://dummy").expect("Failed to create test pool")
}

/// An `AppState` whose repositories and store are fresh, expectation-free
/// mocks. Tests overwrite the fields they care about.
pub fn test_state() -> AppState {
    AppState {
        config: Config::from_env().expect("Failed to load config"),
        db_pool: test_pool(),
        user_repo: Arc::new(MockUserRepositoryTrait::new()),
        post_repo: Arc::new(MockPostRepositoryTrait::new()),
        comment_repo: Arc::new(MockCommentRepositoryTrait::new()),
        article_repo: Arc::new(MockArticleRepositoryTrait::new()),
        video_repo: Arc::new(MockVideoRepositoryTrait::new()),
        fetcher: Arc::new(HttpFetcher),
        store: Arc::new(MockObjectStore::new()),
    }
}
