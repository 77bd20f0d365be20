use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    auth::{dtos::ErrorResponse, middleware::AuthenticatedUser},
    community::dtos::{
        AuthoredCommentView, CommentView, CreateCommentRequest, CreatePostRequest, ListPostsQuery,
        PAGE_SIZE, PostView, USER_ACTIVITY_LIMIT,
    },
    entities::User,
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

/// Load the acting user or map the failure to an HTTP error.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, Response> {
    match state.user_repo.find_by_id(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(error_response(StatusCode::UNAUTHORIZED, "Unknown user")),
        Err(err) => Err(internal_error("failed to load user", err)),
    }
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Response {
    let board = query.board_filter();
    let page = query.page();
    let offset = (page - 1) * PAGE_SIZE;

    let total = match state.post_repo.count(board).await {
        Ok(total) => total,
        Err(err) => return internal_error("failed to count posts", err),
    };

    match state.post_repo.list(board, PAGE_SIZE, offset).await {
        Ok(posts) => Json(json!({
            "success": true,
            "posts": posts.into_iter().map(PostView::from).collect::<Vec<_>>(),
            "total": total,
            "page": page,
            "pageSize": PAGE_SIZE,
        }))
        .into_response(),
        Err(err) => internal_error("failed to list posts", err),
    }
}

pub async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.post_repo.find_by_id(id).await {
        Ok(Some(post)) => Json(json!({
            "success": true,
            "post": PostView::from(post),
        }))
        .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Post not found"),
        Err(err) => internal_error("failed to load post", err),
    }
}

pub async fn create_post(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Response {
    if let Err(error) = payload.validate() {
        return error_response(StatusCode::BAD_REQUEST, &error);
    }

    let user = match load_user(&state, auth_user.user_id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state
        .post_repo
        .create(
            &payload.board,
            &payload.title,
            &payload.content,
            user.id,
            &user.username,
            payload.images,
        )
        .await
    {
        Ok(post) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "post": PostView::from(post),
            })),
        )
            .into_response(),
        Err(err) => internal_error("failed to create post", err),
    }
}

pub async fn delete_post(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let post = match state.post_repo.find_by_id(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Post not found"),
        Err(err) => return internal_error("failed to load post", err),
    };

    let user = match load_user(&state, auth_user.user_id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if post.author_id != user.id && !user.is_admin() {
        return error_response(StatusCode::FORBIDDEN, "Not allowed to delete this post");
    }

    match state.post_repo.delete(id).await {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Post not found"),
        Err(err) => internal_error("failed to delete post", err),
    }
}

pub async fn list_comments(State(state): State<AppState>, Path(post_id): Path<Uuid>) -> Response {
    match state.comment_repo.list_by_post(post_id).await {
        Ok(comments) => Json(json!({
            "success": true,
            "comments": comments.into_iter().map(CommentView::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(err) => internal_error("failed to list comments", err),
    }
}

pub async fn create_comment(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Response {
    if let Err(error) = payload.validate() {
        return error_response(StatusCode::BAD_REQUEST, &error);
    }

    let user = match load_user(&state, auth_user.user_id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.post_repo.find_by_id(payload.post_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Post not found"),
        Err(err) => return internal_error("failed to load post", err),
    }

    match state
        .comment_repo
        .create(
            payload.post_id,
            &payload.content,
            user.id,
            &user.username,
            payload.images,
            payload.reply_to_author_id,
            payload.reply_to_author_name,
        )
        .await
    {
        Ok(comment) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "comment": CommentView::from(comment),
            })),
        )
            .into_response(),
        Err(err) => internal_error("failed to create comment", err),
    }
}

pub async fn delete_comment(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let comment = match state.comment_repo.find_by_id(id).await {
        Ok(Some(comment)) => comment,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Comment not found"),
        Err(err) => return internal_error("failed to load comment", err),
    };

    let user = match load_user(&state, auth_user.user_id).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if comment.author_id != user.id && !user.is_admin() {
        return error_response(StatusCode::FORBIDDEN, "Not allowed to delete this comment");
    }

    match state.comment_repo.delete(id).await {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Comment not found"),
        Err(err) => internal_error("failed to delete comment", err),
    }
}

pub async fn user_posts(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Response {
    let total = match state.post_repo.count_by_author(user_id).await {
        Ok(total) => total,
        Err(err) => return internal_error("failed to count user posts", err),
    };

    match state
        .post_repo
        .list_by_author(user_id, USER_ACTIVITY_LIMIT)
        .await
    {
        Ok(posts) => Json(json!({
            "success": true,
            "posts": posts.into_iter().map(PostView::from).collect::<Vec<_>>(),
            "total": total,
        }))
        .into_response(),
        Err(err) => internal_error("failed to list user posts", err),
    }
}

pub async fn user_comments(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Response {
    let total = match state.comment_repo.count_by_author(user_id).await {
        Ok(total) => total,
        Err(err) => return internal_error("failed to count user comments", err),
    };

    match state
        .comment_repo
        .list_by_author(user_id, USER_ACTIVITY_LIMIT)
        .await
    {
        Ok(comments) => Json(json!({
            "success": true,
            "comments": comments
                .into_iter()
                .map(AuthoredCommentView::from)
                .collect::<Vec<_>>(),
            "total": total,
        }))
        .into_response(),
        Err(err) => internal_error("failed to list user comments", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::jwt::JwtService,
        config::Config,
        entities::{Comment, Post},
        repositories::{
            comment::MockCommentRepositoryTrait, post::MockPostRepositoryTrait,
            user::MockUserRepositoryTrait,
        },
        test_support,
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header::AUTHORIZATION},
        routing::{delete, get, post},
    };
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/community/posts", get(list_posts))
            .route("/community/post", post(create_post))
            .route("/community/post/{id}", get(get_post))
            .route("/community/post/{id}", delete(delete_post))
            .route("/community/comments/{post_id}", get(list_comments))
            .route("/community/comment", post(create_comment))
            .route("/community/comment/{id}", delete(delete_comment))
            .with_state(state)
    }

    fn bearer(user_id: Uuid) -> String {
        let config = Config::from_env().expect("Failed to load config");
        let token = JwtService::new(config.jwt_secret())
            .generate_token(user_id)
            .expect("Failed to generate token");
        format!("Bearer {token}")
    }

    fn sample_post(author_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            board: "tech".to_string(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            author_id,
            author_name: "alice".to_string(),
            images: vec![],
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    fn sample_user(id: Uuid, role: &str) -> User {
        User {
            id,
            username: "alice".to_string(),
            pw_hash: "x".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_posts_board_all_means_no_filter() {
        let mut post_repo = MockPostRepositoryTrait::new();
        post_repo
            .expect_count()
            .withf(|board| board.is_none())
            .returning(|_| Ok(1));
        post_repo
            .expect_list()
            .withf(|board, limit, offset| board.is_none() && *limit == 20 && *offset == 0)
            .returning(|_, _, _| Ok(vec![sample_post(Uuid::new_v4())]));

        let mut state = test_support::test_state();
        state.post_repo = Arc::new(post_repo);

        let request = Request::builder()
            .uri("/community/posts?board=all")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["total"], 1);
        assert_eq!(json["posts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_post_requires_auth() {
        let app = app(test_support::test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/community/post")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"board": "tech", "title": "t", "content": "c"}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_post_rejects_missing_fields() {
        let user_id = Uuid::new_v4();
        let app = app(test_support::test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/community/post")
            .header(AUTHORIZATION, bearer(user_id))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"board": "tech", "title": " ", "content": "c"}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_post_uses_stored_username() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "user"))));

        let mut post_repo = MockPostRepositoryTrait::new();
        post_repo
            .expect_create()
            .withf(|_, _, _, _, author_name, _| author_name == "alice")
            .returning(|board, title, content, author_id, author_name, images| {
                Ok(Post {
                    id: Uuid::new_v4(),
                    board: board.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                    author_id,
                    author_name: author_name.to_string(),
                    images,
                    comment_count: 0,
                    created_at: Utc::now(),
                })
            });

        let mut state = test_support::test_state();
        state.user_repo = Arc::new(user_repo);
        state.post_repo = Arc::new(post_repo);

        let request = Request::builder()
            .method("POST")
            .uri("/community/post")
            .header(AUTHORIZATION, bearer(user_id))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"board": "tech", "title": "t", "content": "c"}).to_string(),
            ))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["post"]["authorName"], "alice");
    }

    #[tokio::test]
    async fn test_delete_post_forbidden_for_other_user() {
        let author_id = Uuid::new_v4();
        let intruder_id = Uuid::new_v4();
        let post = sample_post(author_id);
        let post_id = post.id;

        let mut post_repo = MockPostRepositoryTrait::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "user"))));

        let mut state = test_support::test_state();
        state.post_repo = Arc::new(post_repo);
        state.user_repo = Arc::new(user_repo);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/community/post/{post_id}"))
            .header(AUTHORIZATION, bearer(intruder_id))
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_post_allowed_for_admin() {
        let author_id = Uuid::new_v4();
        let admin_id = Uuid::new_v4();
        let post = sample_post(author_id);
        let post_id = post.id;

        let mut post_repo = MockPostRepositoryTrait::new();
        post_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        post_repo.expect_delete().returning(|_| Ok(true));

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "admin"))));

        let mut state = test_support::test_state();
        state.post_repo = Arc::new(post_repo);
        state.user_repo = Arc::new(user_repo);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/community/post/{post_id}"))
            .header(AUTHORIZATION, bearer(admin_id))
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_comment_rejects_empty() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "user"))));

        let mut state = test_support::test_state();
        state.user_repo = Arc::new(user_repo);

        let request = Request::builder()
            .method("POST")
            .uri("/community/comment")
            .header(AUTHORIZATION, bearer(user_id))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"postId": Uuid::new_v4(), "content": ""}).to_string(),
            ))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_comment_on_missing_post_is_404() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "user"))));

        let mut post_repo = MockPostRepositoryTrait::new();
        post_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut state = test_support::test_state();
        state.user_repo = Arc::new(user_repo);
        state.post_repo = Arc::new(post_repo);

        let request = Request::builder()
            .method("POST")
            .uri("/community/comment")
            .header(AUTHORIZATION, bearer(user_id))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"postId": Uuid::new_v4(), "content": "hello"}).to_string(),
            ))
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_comment_author_can_delete() {
        let author_id = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            content: "hi".to_string(),
            author_id,
            author_name: "alice".to_string(),
            images: vec![],
            reply_to_author_id: None,
            reply_to_author_name: None,
            created_at: Utc::now(),
        };
        let comment_id = comment.id;

        let mut comment_repo = MockCommentRepositoryTrait::new();
        comment_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment.clone())));
        comment_repo.expect_delete().returning(|_| Ok(true));

        let mut user_repo = MockUserRepositoryTrait::new();
        user_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id, "user"))));

        let mut state = test_support::test_state();
        state.comment_repo = Arc::new(comment_repo);
        state.user_repo = Arc::new(user_repo);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/community/comment/{comment_id}"))
            .header(AUTHORIZATION, bearer(author_id))
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
