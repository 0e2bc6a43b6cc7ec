//! API surface tests against an in-memory router
//!
//! These run without any model file present, which is itself a supported
//! deployment state: the server starts, control-plane endpoints work, and
//! processing requests report the model as unavailable.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use drishti_server::http::{create_router, ApiState};
use drishti_vision::{ModelLoader, ModelRegistry, ServiceConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestService {
    state: ApiState,
    _dirs: TempDir,
}

fn test_service() -> TestService {
    let dirs = TempDir::new().unwrap();
    let config = ServiceConfig {
        upload_dir: dirs.path().join("uploads"),
        processed_dir: dirs.path().join("processed"),
        model_dir: dirs.path().join("models"),
        ..ServiceConfig::default()
    };
    config.ensure_dirs().unwrap();
    let registry = Arc::new(ModelRegistry::builtin(&config.model_dir));
    let loader = Arc::new(ModelLoader::new(registry.clone(), &config.default_model));
    TestService {
        state: ApiState {
            config: Arc::new(config),
            registry,
            loader,
        },
        _dirs: dirs,
    }
}

async fn send(state: &ApiState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "drishti-test-boundary";

fn post_file(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn home_reports_running() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["message"].as_str().unwrap().contains("/upload"));
}

#[tokio::test]
async fn models_endpoint_lists_catalog() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_model"], "best");

    let models = body["models"].as_object().unwrap();
    assert_eq!(models.len(), 4);
    for key in ["yolov12n", "yolov12s", "yolov12m", "best"] {
        assert!(models.contains_key(key), "{key}");
        assert!(models[key]["description"].is_string());
    }
    assert_eq!(models["best"]["current"], true);
    assert_eq!(models["yolov12n"]["current"], false);
}

#[tokio::test]
async fn switch_without_key_is_bad_request() {
    let service = test_service();
    let (status, body) = send(&service.state, post_json("/models/switch", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No model specified");
}

#[tokio::test]
async fn switch_unknown_key_is_not_found_and_keeps_current() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_json("/models/switch", json!({"model": "resnet"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Model resnet not found");

    let (_, models) = send(&service.state, get("/models")).await;
    assert_eq!(models["current_model"], "best");
}

#[tokio::test]
async fn switch_with_missing_model_file_is_server_error_and_keeps_current() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_json("/models/switch", json!({"model": "yolov12n"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load model yolov12n");

    let (_, models) = send(&service.state, get("/models")).await;
    assert_eq!(models["current_model"], "best");
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_file("/upload", "attachment", "t.png", b"data"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn upload_unsupported_extension_is_bad_request_and_writes_nothing() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_file("/upload", "file", "notes.txt", b"plain text"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type");

    let processed: Vec<_> = std::fs::read_dir(&service.state.config.processed_dir)
        .unwrap()
        .collect();
    assert!(processed.is_empty());
}

#[tokio::test]
async fn upload_traversal_filename_is_rejected() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_file("/upload", "file", "../../etc/evil.png", b"data"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid filename");
}

#[tokio::test]
async fn upload_image_without_model_is_server_error() {
    let service = test_service();
    let (status, body) = send(
        &service.state,
        post_file("/upload", "file", "t.png", b"not really a png"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "YOLO model not available");

    // The upload itself is persisted before the model check.
    assert!(service.state.config.upload_dir.join("t.png").is_file());
}

#[tokio::test]
async fn missing_processed_file_is_json_not_found() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/processed/absent.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn missing_uploaded_file_is_json_not_found() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/uploads/absent.mp4")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn traversal_path_in_file_routes_is_rejected() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/uploads/..hidden")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid path");
}

#[tokio::test]
async fn uploaded_file_is_served_back_with_content_type() {
    let service = test_service();
    tokio::fs::write(
        service.state.config.upload_dir.join("t.png"),
        b"png-bytes",
    )
    .await
    .unwrap();

    let response = create_router(service.state.clone())
        .oneshot(get("/uploads/t.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn processed_file_is_served_back() {
    let service = test_service();
    tokio::fs::write(
        service.state.config.processed_dir.join("clip.mp4"),
        b"mp4-bytes",
    )
    .await
    .unwrap();

    let response = create_router(service.state.clone())
        .oneshot(get("/processed/clip.mp4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "video/mp4");
}

#[tokio::test]
async fn test_endpoint_reports_configuration() {
    let service = test_service();
    let (status, body) = send(&service.state, get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "API is accessible");
    assert_eq!(body["current_model"], "best");
    assert_eq!(
        body["upload_folder"],
        service.state.config.upload_dir.display().to_string()
    );
    let available = body["available_models"].as_array().unwrap();
    assert_eq!(available.len(), 4);
    assert_eq!(available[3], "best");
}
