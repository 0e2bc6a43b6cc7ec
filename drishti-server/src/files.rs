// Serving uploaded and processed media back to clients

use crate::http::ErrorResponse;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::Path;
use tracing::{info, warn};

/// Content type for a served file, derived from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "File not found".to_string(),
        }),
    )
        .into_response()
}

/// Serve one file from `dir`, or a JSON 404 if it does not exist. The
/// filename must already be sanitized by the caller.
pub async fn serve_from_dir(dir: &Path, filename: &str) -> Response {
    let path = dir.join(filename);
    if !path.is_file() {
        warn!("File not found: {}", path.display());
        return not_found();
    }
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            info!("Serving file: {}", filename);
            (
                [(header::CONTENT_TYPE, content_type_for(filename))],
                Body::from(bytes),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            not_found()
        }
    }
}
