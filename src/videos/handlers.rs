use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    articles::handlers::check_admin,
    auth::dtos::ErrorResponse,
    metadata::{self, PageMetadata, Source},
    videos::dtos::{AddVideoRequest, ReorderRequest, VideoView, VisibilityRequest},
};

/// First `http(s)://` run of printable ASCII. Share text pasted from the
/// mobile apps surrounds the link with emoji, CJK phrases and newlines.
static SHARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[!-~]+").unwrap());

/// Pull a usable URL out of raw share text. `None` when no `http(s)://` run
/// exists at all.
pub fn clean_share_url(raw: &str) -> Option<String> {
    SHARE_URL_RE.find(raw).map(|m| m.as_str().to_string())
}

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

fn pick(caller: &str, extracted: &str) -> String {
    if caller.trim().is_empty() {
        extracted.to_string()
    } else {
        caller.to_string()
    }
}

pub async fn list_videos(State(state): State<AppState>) -> Response {
    match state.video_repo.list_visible().await {
        Ok(videos) => Json(json!({
            "success": true,
            "videos": videos.into_iter().map(VideoView::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(err) => internal_error("failed to list videos", err),
    }
}

pub async fn list_all_videos(State(state): State<AppState>) -> Response {
    match state.video_repo.list_all().await {
        Ok(videos) => Json(json!({
            "success": true,
            "videos": videos.into_iter().map(VideoView::from).collect::<Vec<_>>(),
        }))
        .into_response(),
        Err(err) => internal_error("failed to list videos", err),
    }
}

pub async fn add_video(
    State(state): State<AppState>,
    Json(payload): Json<AddVideoRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    let Some(url) = clean_share_url(&payload.url) else {
        return error_response(StatusCode::BAD_REQUEST, "A video URL is required");
    };

    match state.video_repo.find_by_url(&url).await {
        Ok(Some(_)) => return error_response(StatusCode::CONFLICT, "Video already exists"),
        Ok(None) => {}
        Err(err) => return internal_error("failed to check for duplicate video", err),
    }

    let source = Source::detect(&url);

    let extracted = match metadata::resolve(
        state.fetcher.as_ref(),
        &url,
        state.config.metadata_offset(),
    )
    .await
    {
        Ok(meta) => meta,
        Err(err) => {
            warn!(%err, url = %url, "metadata extraction failed, storing defaults");
            PageMetadata::default()
        }
    };

    let mut title = pick(&payload.title, &extracted.title);
    if title.trim().is_empty() {
        title = source.default_title().to_string();
    }
    let description = pick(&payload.description, &extracted.description);
    let cover_image = pick(&payload.cover_image, &extracted.cover_image);
    let author = pick(&payload.author, &extracted.author);
    let publish_time = pick(&payload.publish_time, &extracted.publish_time);

    match state
        .video_repo
        .create(
            &url,
            &title,
            &description,
            &cover_image,
            source.as_str(),
            &author,
            &publish_time,
        )
        .await
    {
        Ok(video) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "video": VideoView::from(video),
            })),
        )
            .into_response(),
        Err(err) => internal_error("failed to create video", err),
    }
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<crate::articles::dtos::AdminActionRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    match state.video_repo.delete(id).await {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Video not found"),
        Err(err) => internal_error("failed to delete video", err),
    }
}

pub async fn reorder_videos(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    for entry in &payload.orders {
        if let Err(err) = state.video_repo.set_sort_order(entry.id, entry.order).await {
            return internal_error("failed to reorder videos", err);
        }
    }

    Json(json!({ "success": true })).into_response()
}

pub async fn set_video_visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VisibilityRequest>,
) -> Response {
    if let Err(response) = check_admin(&state, &payload.password) {
        return response;
    }

    match state.video_repo.set_visibility(id, payload.visible).await {
        Ok(true) => Json(json!({ "success": true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Video not found"),
        Err(err) => internal_error("failed to update video visibility", err),
    }
}
