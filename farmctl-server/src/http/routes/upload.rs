//! File upload endpoint
//!
//! Accepts a multipart form with a `file` part and an optional `folder`
//! text part, stores the file in the configured bucket and returns its
//! public URL.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use axum::body::Bytes;
use uuid::Uuid;

use crate::clients::StoredObject;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use crate::models::{object_path, upload_folder, validate_upload, ValidationError, MAX_UPLOAD_BYTES};

/// Headroom for multipart framing and the `folder` part
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

struct FilePart {
    name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

fn unreadable(e: MultipartError) -> ApiError {
    ApiError::Validation(ValidationError::Upload {
        reason: e.body_text(),
    })
}

/// POST /api/upload
async fn upload(
    CurrentUser(user): CurrentUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<StoredObject>, ApiError> {
    let mut file: Option<FilePart> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
        let part = field.name().unwrap_or_default().to_string();
        match part.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(unreadable)?;
                file = Some(FilePart {
                    name,
                    content_type,
                    bytes,
                });
            }
            "folder" => folder = Some(field.text().await.map_err(unreadable)?),
            other => tracing::debug!(part = other, "Ignoring form part"),
        }
    }

    let file = file.ok_or(ValidationError::Missing { field: "file" })?;
    validate_upload(file.content_type.as_deref(), file.bytes.len())?;
    let folder = upload_folder(folder.as_deref())?;

    let path = object_path(&folder, Uuid::new_v4(), &file.name);
    let content_type = file
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let stored = state
        .storage
        .upload(&path, &content_type, file.bytes.to_vec())
        .await?;

    tracing::info!(user_id = %user.id, path = %stored.path, "Upload stored");
    Ok(Json(stored))
}

/// Upload routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES))
}
