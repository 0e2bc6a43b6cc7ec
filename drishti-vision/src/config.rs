//! Service configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Runtime configuration for the detection service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Directory uploaded media is written to.
    pub upload_dir: PathBuf,
    /// Directory annotated media is written to.
    pub processed_dir: PathBuf,
    /// Directory holding the `.onnx` model files.
    pub model_dir: PathBuf,
    /// Registry key loaded at startup.
    pub default_model: String,
    /// Upper bound for a single upload body.
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
            model_dir: PathBuf::from("models"),
            default_model: "best".to_string(),
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("Port must be non-zero".to_string());
        }
        if self.default_model.is_empty() {
            return Err("Default model key must not be empty".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Upload size limit must be non-zero".to_string());
        }
        Ok(())
    }

    /// Create the upload and processed directories if absent.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.processed_dir)?;
        Ok(())
    }

    /// Base URL clients can use to reach served files.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
