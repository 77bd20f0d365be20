use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    app_state::AppState, articles, auth, community, health, uploads,
    uploads::handlers::MAX_UPLOAD_BYTES, videos,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/healthz", get(health::health_check))
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        .route("/community/posts", get(community::handlers::list_posts))
        .route("/community/post", post(community::handlers::create_post))
        .route(
            "/community/post/{id}",
            get(community::handlers::get_post).delete(community::handlers::delete_post),
        )
        .route(
            "/community/comments/{post_id}",
            get(community::handlers::list_comments),
        )
        .route(
            "/community/comment",
            post(community::handlers::create_comment),
        )
        .route(
            "/community/comment/{id}",
            delete(community::handlers::delete_comment),
        )
        .route(
            "/community/user/{id}/posts",
            get(community::handlers::user_posts),
        )
        .route(
            "/community/user/{id}/comments",
            get(community::handlers::user_comments),
        )
        .route("/articles", get(articles::handlers::list_articles))
        .route("/articles/add", post(articles::handlers::add_article))
        .route("/articles/{id}", delete(articles::handlers::delete_article))
        .route(
            "/articles/{id}/delete",
            post(articles::handlers::delete_article_by_id_or_slug),
        )
        .route("/videos", get(videos::handlers::list_videos))
        .route("/videos/all", get(videos::handlers::list_all_videos))
        .route("/videos/add", post(videos::handlers::add_video))
        .route("/videos/reorder", put(videos::handlers::reorder_videos))
        .route("/videos/{id}", delete(videos::handlers::delete_video))
        .route(
            "/videos/{id}/visibility",
            put(videos::handlers::set_video_visibility),
        )
        .route("/upload/image", post(uploads::handlers::upload_image))
        // Multipart bodies need headroom over the 5 MB image cap.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_reports_name_and_version() {
        let app = router(test_support::test_state());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["name"], "pavilion");
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = router(test_support::test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
