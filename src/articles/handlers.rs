use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    articles::dtos::{AddArticleRequest, AdminActionRequest, ArticleView},
    auth::dtos::ErrorResponse,
    metadata::{self, model::PageMetadata, source::Source},
};

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error(context: &str, err: anyhow::Error) -> Response {
    error!(%err, "{context}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}

/// Curation endpoints are gated by a shared admin password in the body, not
/// by a user account.
pub(crate) fn check_admin(state: &AppState, password: &str) -> Result<(), Response> {
    if password == state.config.admin_password() {
        Ok(())
    } else {
        Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid admin password",
        ))
    }
}

/// Caller value wins when present, extraction fills the rest.
fn pick(caller: &str, extracted: &str) -> String {
    if caller.trim().is_empty() {
        extracted.to_string()
    } else {
        caller.to_string()
    }
}

pub async fn list_articles(State(state): State<AppState>) -> Response {
    match state.article_repo.list().await {
        Ok(articles) => Json(json!({
            "success": true,
            "articles": articles.into_iter().map(ArticleView::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(err) => internal_error("failed to list articles", err),
    }
}

pub async fn add_article(
    State(state): State<AppState>,
    Json(payload): Json<AddArticleRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    let url = payload.url.trim();
    if url.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "URL is required");
    }

    match state.article_repo.find_by_url(url).await {
        Ok(Some(_)) => return error_response(StatusCode::CONFLICT, "Article already exists"),
        Ok(None) => {}
        Err(err) => return internal_error("failed to check for duplicate article", err),
    }

    let source = Source::detect(url);

    // Extraction failure never blocks the add; the caller's fields (or
    // blanks) are persisted instead.
    let extracted = match metadata::resolve(
        state.fetcher.as_ref(),
        url,
        state.config.metadata_offset(),
    )
    .await
    {
        Ok(meta) => meta,
        Err(err) => {
            warn!(%err, url = %url, "metadata extraction failed, storing caller fields only");
            PageMetadata::default()
        }
    };

    let title = pick(&payload.title, &extracted.title);
    let author = pick(&payload.author, &extracted.author);
    let image = pick(&payload.image, &extracted.cover_image);
    let description = pick(&payload.description, &extracted.description);
    let publish_time = pick(&payload.publish_time, &extracted.publish_time);

    match state
        .article_repo
        .create(
            url,
            &title,
            &author,
            &image,
            &description,
            &publish_time,
            source.as_str(),
        )
        .await
    {
        Ok(article) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "article": ArticleView::from(article),
            })),
        )
            .into_response(),
        Err(err) => internal_error("failed to create article", err),
    }
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminActionRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    match state.article_repo.delete(id).await {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Article not found"),
        Err(err) => internal_error("failed to delete article", err),
    }
}

/// POST alternative for clients that cannot send DELETE. The path segment is
/// a UUID when the caller knows it, otherwise it is treated as a WeChat
/// article slug and matched by the canonical article URL.
pub async fn delete_article_by_id_or_slug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AdminActionRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    let deleted = if let Ok(uuid) = Uuid::parse_str(&id) {
        state.article_repo.delete(uuid).await
    } else {
        let url = format!("https://mp.weixin.qq.com/s/{id}");
        state.article_repo.delete_by_url(&url).await
    };

    match deleted {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Article not found"),
        Err(err) => internal_error("failed to delete article", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::Article,
        repositories::article::MockArticleRepositoryTrait,
        test_support::{self, FailingFetcher, StaticFetcher},
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::Request,
        routing::{delete, get, post},
    };
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/articles", get(list_articles))
            .route("/articles/add", post(add_article))
            .route("/articles/{id}", delete(delete_article))
            .route("/articles/{id}/delete", post(delete_article_by_id_or_slug))
            .with_state(state)
    }

    fn admin_password(state: &AppState) -> String {
        state.config.admin_password().to_string()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn stored_article(url: &str, title: &str) -> Article {
        Article {
            id: Uuid::new_v4(),
            url: url.to_string(),
            title: title.to_string(),
            author: String::new(),
            image: String::new(),
            description: String::new(),
            publish_time: String::new(),
            source: "other".to_string(),
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_article_rejects_wrong_password() {
        let app = app(test_support::test_state());
        let request = json_request(
            "POST",
            "/articles/add",
            serde_json::json!({"password": "wrong", "url": "https://example.com/a"}),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_add_article_requires_url() {
        let state = test_support::test_state();
        let password = admin_password(&state);
        let request = json_request(
            "POST",
            "/articles/add",
            serde_json::json!({"password": password, "url": "  "}),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_article_rejects_duplicate_url() {
        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo
            .expect_find_by_url()
            .returning(|url| Ok(Some(stored_article(url, "existing"))));

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);

        let request = json_request(
            "POST",
            "/articles/add",
            serde_json::json!({"password": admin_password(&state), "url": "https://example.com/a"}),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_article_survives_fetch_failure() {
        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo.expect_find_by_url().returning(|_| Ok(None));
        article_repo
            .expect_create()
            .withf(|_, title, _, _, _, _, _| title == "caller title")
            .returning(|url, title, author, image, description, publish_time, source| {
                Ok(Article {
                    id: Uuid::new_v4(),
                    url: url.to_string(),
                    title: title.to_string(),
                    author: author.to_string(),
                    image: image.to_string(),
                    description: description.to_string(),
                    publish_time: publish_time.to_string(),
                    source: source.to_string(),
                    added_at: Utc::now(),
                })
            });

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);
        state.fetcher = Arc::new(FailingFetcher);

        let request = json_request(
            "POST",
            "/articles/add",
            serde_json::json!({
                "password": admin_password(&state),
                "url": "https://example.com/a",
                "title": "caller title",
            }),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_add_article_caller_fields_override_extracted() {
        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo.expect_find_by_url().returning(|_| Ok(None));
        article_repo
            .expect_create()
            .withf(|_, title, author, _, description, _, _| {
                // Title comes from the caller, the rest from the page.
                title == "caller title" && author == "页面作者" && description == "页面描述"
            })
            .returning(|url, title, author, image, description, publish_time, source| {
                Ok(Article {
                    id: Uuid::new_v4(),
                    url: url.to_string(),
                    title: title.to_string(),
                    author: author.to_string(),
                    image: image.to_string(),
                    description: description.to_string(),
                    publish_time: publish_time.to_string(),
                    source: source.to_string(),
                    added_at: Utc::now(),
                })
            });

        let html = concat!(
            "<html><head>",
            "<meta property=\"og:title\" content=\"页面标题\">",
            "<meta property=\"og:description\" content=\"页面描述\">",
            "<meta property=\"og:article:author\" content=\"页面作者\">",
            "</head><body></body></html>",
        );

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);
        state.fetcher = Arc::new(StaticFetcher {
            html: html.to_string(),
        });

        let request = json_request(
            "POST",
            "/articles/add",
            serde_json::json!({
                "password": admin_password(&state),
                "url": "https://example.com/a",
                "title": "caller title",
            }),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_delete_by_slug_builds_wechat_url() {
        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo
            .expect_delete_by_url()
            .withf(|url| url == "https://mp.weixin.qq.com/s/AbCdEf123")
            .returning(|_| Ok(true));

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);

        let request = json_request(
            "POST",
            "/articles/AbCdEf123/delete",
            serde_json::json!({"password": admin_password(&state)}),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_by_uuid_uses_id_directly() {
        let id = Uuid::new_v4();

        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo
            .expect_delete()
            .withf(move |candidate| *candidate == id)
            .returning(|_| Ok(true));

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);

        let request = json_request(
            "POST",
            &format!("/articles/{id}/delete"),
            serde_json::json!({"password": admin_password(&state)}),
        );

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_articles_success() {
        let mut article_repo = MockArticleRepositoryTrait::new();
        article_repo
            .expect_list()
            .returning(|| Ok(vec![stored_article("https://example.com/a", "one")]));

        let mut state = test_support::test_state();
        state.article_repo = Arc::new(article_repo);

        let request = Request::builder()
            .uri("/articles")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["articles"][0]["title"], "one");
    }
}
