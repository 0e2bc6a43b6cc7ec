//! Detection model loading and lifecycle

pub mod loader;
pub mod yolo;

pub use loader::{ActiveModel, ModelLoader};
pub use yolo::{DetectedObject, YoloModel, COCO_CLASSES};
