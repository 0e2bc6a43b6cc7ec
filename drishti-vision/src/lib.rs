//! drishti-vision: detection core for the drishti media service
//!
//! Loads ONNX object-detection models, classifies uploaded media by
//! extension, runs per-image and per-frame inference, and renders
//! annotated copies of the input files.

pub mod annotate;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod processing;
pub mod registry;

pub use config::ServiceConfig;
pub use error::VisionError;
pub use models::{ActiveModel, ModelLoader, YoloModel};
pub use registry::{ModelEntry, ModelRegistry};
