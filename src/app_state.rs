use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::{
    config::Config,
    fetcher::{HttpFetcher, PageFetcher},
    repositories::{
        ArticleRepository, ArticleRepositoryTrait, CommentRepository, CommentRepositoryTrait,
        PostRepository, PostRepositoryTrait, UserRepository, UserRepositoryTrait, VideoRepository,
        VideoRepositoryTrait,
    },
    uploads::store::{DiskStore, ObjectStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db_pool: Pool<Postgres>,
    pub user_repo: Arc<dyn UserRepositoryTrait>,
    pub post_repo: Arc<dyn PostRepositoryTrait>,
    pub comment_repo: Arc<dyn CommentRepositoryTrait>,
    pub article_repo: Arc<dyn ArticleRepositoryTrait>,
    pub video_repo: Arc<dyn VideoRepositoryTrait>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(config: Config, pool: Pool<Postgres>) -> Self {
        let store = DiskStore::new(config.upload_dir());
        Self {
            config,
            db_pool: pool.clone(),
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            post_repo: Arc::new(PostRepository::new(pool.clone())),
            comment_repo: Arc::new(CommentRepository::new(pool.clone())),
            article_repo: Arc::new(ArticleRepository::new(pool.clone())),
            video_repo: Arc::new(VideoRepository::new(pool)),
            fetcher: Arc::new(HttpFetcher),
            store: Arc::new(store),
        }
    }
}
