use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use serde_json::json;
use tracing::error;

use crate::{
    app_state::AppState,
    auth::{dtos::ErrorResponse, middleware::AuthenticatedUser},
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// File extension for an allowed image content type, `None` otherwise.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// `images/<millis>_<rand9>.<ext>` — collision-safe enough for this volume
/// and sortable by upload time.
fn object_key(ext: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("images/{}_{}.{}", Utc::now().timestamp_millis(), suffix, ext)
}

pub async fn upload_image(
    _auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let Some(ext) = extension_for(&content_type) else {
            return error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Only JPEG, PNG, GIF and WebP images are accepted",
            );
        };

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => {
                return error_response(StatusCode::BAD_REQUEST, "Failed to read uploaded file");
            }
        };

        if bytes.len() > MAX_UPLOAD_BYTES {
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Image exceeds the 5 MB limit");
        }

        let key = object_key(ext);
        if let Err(err) = state.store.put(&key, bytes).await {
            error!(%err, "failed to store upload");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload");
        }

        let url = format!("{}/{}", state.config.upload_base_url(), key);
        return Json(json!({
            "success": true,
            "url": url,
            "key": key,
        }))
        .into_response();
    }

    error_response(StatusCode::BAD_REQUEST, "Multipart field 'file' is required")
}
