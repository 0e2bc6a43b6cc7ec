//! Catalog of selectable detection models

use std::path::{Path, PathBuf};

/// One selectable model file.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub key: String,
    pub path: PathBuf,
    pub description: String,
}

/// Fixed, ordered catalog of model files, built once at startup and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// The catalog shipped with the service, resolved against `model_dir`.
    pub fn builtin(model_dir: &Path) -> Self {
        let entry = |key: &str, file: &str, description: &str| ModelEntry {
            key: key.to_string(),
            path: model_dir.join(file),
            description: description.to_string(),
        };
        Self {
            entries: vec![
                entry(
                    "yolov12n",
                    "yolo12n.onnx",
                    "YOLOv12 Nano - Fast, lightweight model",
                ),
                entry(
                    "yolov12s",
                    "yolo12s.onnx",
                    "YOLOv12 Small - Balanced speed and accuracy",
                ),
                entry(
                    "yolov12m",
                    "yolo12m.onnx",
                    "YOLOv12 Medium - Balanced speed and accuracy",
                ),
                entry(
                    "best",
                    "best.onnx",
                    "Custom trained model - Best for specific use cases",
                ),
            ],
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}
