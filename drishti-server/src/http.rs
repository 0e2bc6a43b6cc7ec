// HTTP routes for model management, media uploads, and file serving

use crate::files;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use drishti_vision::media::{self, MediaKind};
use drishti_vision::processing::{image, video, Detection};
use drishti_vision::{ModelLoader, ModelRegistry, ServiceConfig, VisionError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<ServiceConfig>,
    pub registry: Arc<ModelRegistry>,
    pub loader: Arc<ModelLoader>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Create the HTTP router with all API routes.
pub fn create_router(state: ApiState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(home_handler))
        .route("/models", get(get_models_handler))
        .route("/models/switch", post(switch_model_handler))
        .route("/upload", post(upload_handler))
        .route("/processed/:filename", get(processed_file_handler))
        .route("/uploads/:filename", get(uploaded_file_handler))
        .route("/test", get(test_handler))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HomeResponse {
    status: &'static str,
    message: &'static str,
}

/// Simple home route to verify the server is running.
async fn home_handler() -> impl IntoResponse {
    Json(HomeResponse {
        status: "running",
        message: "Object Detection API is running. Upload files to /upload endpoint.",
    })
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    description: String,
    current: bool,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: IndexMap<String, ModelInfo>,
    current_model: String,
}

/// List the selectable models in catalog order.
async fn get_models_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let current = state.loader.current_key();
    let models = state
        .registry
        .entries()
        .iter()
        .map(|entry| {
            (
                entry.key.clone(),
                ModelInfo {
                    description: entry.description.clone(),
                    current: entry.key == current,
                },
            )
        })
        .collect();
    Json(ModelsResponse {
        models,
        current_model: current,
    })
}

#[derive(Debug, Deserialize)]
struct SwitchRequest {
    model: Option<String>,
}

#[derive(Debug, Serialize)]
struct SwitchResponse {
    success: bool,
    current_model: String,
}

/// Switch to a different model. A failed load keeps the previous model
/// active.
async fn switch_model_handler(
    State(state): State<ApiState>,
    Json(request): Json<SwitchRequest>,
) -> Response {
    let Some(key) = request.model.filter(|k| !k.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No model specified");
    };
    if !state.registry.contains(&key) {
        return error_response(StatusCode::NOT_FOUND, format!("Model {key} not found"));
    }

    let loader = state.loader.clone();
    let load_key = key.clone();
    let result = tokio::task::spawn_blocking(move || loader.load(&load_key)).await;
    match result {
        Ok(Ok(())) => Json(SwitchResponse {
            success: true,
            current_model: state.loader.current_key(),
        })
        .into_response(),
        Ok(Err(e)) => {
            error!("Failed to load model {}: {}", key, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load model {key}"),
            )
        }
        Err(e) => {
            error!("Model load task failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load model {key}"),
            )
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    processed_file: String,
    #[serde(rename = "type")]
    media_type: &'static str,
    full_url: String,
    detections: Vec<Detection>,
    model_used: String,
    original_file: String,
}

/// Accept one uploaded file, dispatch it to the matching processor, and
/// report the annotated file plus its detections.
async fn upload_handler(State(state): State<ApiState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, axum::body::Bytes)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    match field.bytes().await {
                        Ok(bytes) => {
                            upload = Some((filename, bytes));
                            break;
                        }
                        Err(e) => {
                            error!("Failed to read upload: {}", e);
                            return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("Invalid multipart body: {}", e);
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
        }
    }
    let Some((raw_name, data)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    let filename = match media::sanitize_filename(&raw_name) {
        Ok(name) => name,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    // Unsupported extensions are rejected before anything else happens.
    let kind = match media::classify(&filename) {
        Ok(kind) => kind,
        Err(_) => {
            info!("Unsupported file type: {}", filename);
            return error_response(StatusCode::BAD_REQUEST, "Unsupported file type");
        }
    };

    let upload_path = state.config.upload_dir.join(&filename);
    if let Err(e) = tokio::fs::write(&upload_path, &data).await {
        error!("Error saving file {}: {}", upload_path.display(), e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save file");
    }
    info!("File saved: {}", upload_path.display());

    // Capture the active model once; a concurrent switch must not affect
    // this request.
    let Some(model) = state.loader.snapshot() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            VisionError::ModelUnavailable.to_string(),
        );
    };
    let model_used = model.key.clone();

    let processed_path = state.config.processed_dir.join(&filename);
    let outcome = tokio::task::spawn_blocking(move || match kind {
        MediaKind::Image => image::process(&model, &upload_path, &processed_path),
        MediaKind::Video => video::process(&model, &upload_path, &processed_path),
    })
    .await;

    let detections = match outcome {
        Ok(Ok(detections)) => detections,
        Ok(Err(e)) => {
            error!("{} processing error: {}", kind.as_str(), e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                processing_failure_message(kind, Some(&e)),
            );
        }
        Err(e) => {
            error!("Processing task failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                processing_failure_message(kind, None),
            );
        }
    };

    let processed_file = format!("/processed/{filename}");
    let full_url = format!("{}{}", state.config.base_url(), processed_file);
    Json(UploadResponse {
        processed_file,
        media_type: kind.as_str(),
        full_url,
        detections,
        model_used,
        original_file: format!("/uploads/{filename}"),
    })
    .into_response()
}

/// Client-facing message for a failed processing run; detail stays in the
/// server logs.
fn processing_failure_message(kind: MediaKind, err: Option<&VisionError>) -> &'static str {
    match (kind, err) {
        (MediaKind::Image, Some(VisionError::Encode(_))) => "Failed to save processed image",
        (MediaKind::Image, _) => "Image processing failed",
        (MediaKind::Video, Some(VisionError::Decode(_))) => "Failed to open video file",
        (MediaKind::Video, _) => "Video processing failed",
    }
}

/// Serve a processed file for preview.
async fn processed_file_handler(
    State(state): State<ApiState>,
    Path(filename): Path<String>,
) -> Response {
    match media::sanitize_filename(&filename) {
        Ok(name) => files::serve_from_dir(&state.config.processed_dir, &name).await,
        Err(_) => error_response(StatusCode::BAD_REQUEST, "Invalid path"),
    }
}

/// Serve an original uploaded file for preview.
async fn uploaded_file_handler(
    State(state): State<ApiState>,
    Path(filename): Path<String>,
) -> Response {
    match media::sanitize_filename(&filename) {
        Ok(name) => files::serve_from_dir(&state.config.upload_dir, &name).await,
        Err(_) => error_response(StatusCode::BAD_REQUEST, "Invalid path"),
    }
}

#[derive(Debug, Serialize)]
struct TestResponse {
    status: &'static str,
    message: &'static str,
    upload_folder: String,
    processed_folder: String,
    current_model: String,
    available_models: Vec<String>,
}

/// Diagnostic endpoint reporting the resolved configuration.
async fn test_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(TestResponse {
        status: "success",
        message: "API is accessible",
        upload_folder: state.config.upload_dir.display().to_string(),
        processed_folder: state.config.processed_dir.display().to_string(),
        current_model: state.loader.current_key(),
        available_models: state.registry.keys().map(str::to_string).collect(),
    })
}
