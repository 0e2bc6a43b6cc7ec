//! Active-model lifecycle: loading, fallback, and snapshot publication

use crate::error::VisionError;
use crate::models::YoloModel;
use crate::registry::ModelRegistry;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Immutable pairing of a registry key with its loaded detector.
///
/// Requests capture one snapshot at the start of processing and keep it for
/// their whole lifetime; a concurrent switch publishes a new snapshot
/// without touching captured ones.
pub struct ActiveModel {
    pub key: String,
    pub detector: Arc<YoloModel>,
}

struct LoaderState {
    current_key: String,
    active: Option<Arc<ActiveModel>>,
}

/// Owns the process-wide current model.
pub struct ModelLoader {
    registry: Arc<ModelRegistry>,
    default_key: String,
    state: RwLock<LoaderState>,
}

impl ModelLoader {
    pub fn new(registry: Arc<ModelRegistry>, default_key: &str) -> Self {
        Self {
            registry,
            default_key: default_key.to_string(),
            state: RwLock::new(LoaderState {
                current_key: default_key.to_string(),
                active: None,
            }),
        }
    }

    /// Load a model by registry key and publish it as current.
    ///
    /// An unknown key falls back to the default key. A missing or invalid
    /// model file fails the load and leaves the previously published model
    /// active. The write lock is held only for the pointer swap, never
    /// across session construction.
    pub fn load(&self, key: &str) -> Result<(), VisionError> {
        let key = if self.registry.contains(key) {
            key
        } else {
            warn!("Model {} not found, using default {}", key, self.default_key);
            self.default_key.as_str()
        };
        let entry = self
            .registry
            .lookup(key)
            .ok_or_else(|| VisionError::Model(format!("Model {key} is not in the registry")))?;
        let is_onnx = entry.path.extension().and_then(|e| e.to_str()) == Some("onnx");
        if !is_onnx || !entry.path.is_file() {
            return Err(VisionError::Model(format!(
                "Model file not found or invalid at {}",
                entry.path.display()
            )));
        }

        info!("Loading model {} from {}", key, entry.path.display());
        let detector = YoloModel::new(&entry.path)?;
        let snapshot = Arc::new(ActiveModel {
            key: key.to_string(),
            detector: Arc::new(detector),
        });

        let mut state = self.state.write();
        state.current_key = key.to_string();
        state.active = Some(snapshot);
        info!("Model {} loaded successfully", key);
        Ok(())
    }

    /// Current snapshot, if a model has been loaded.
    pub fn snapshot(&self) -> Option<Arc<ActiveModel>> {
        self.state.read().active.clone()
    }

    /// Key of the current model. Before the first successful load this
    /// reports the configured default, which is what `/models` advertises.
    pub fn current_key(&self) -> String {
        self.state.read().current_key.clone()
    }
}
