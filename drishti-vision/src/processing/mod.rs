//! Media processors producing annotated files plus wire-format detections

pub mod image;
pub mod video;

use crate::models::DetectedObject;
use serde::Serialize;

/// One reported bounding box in the response wire format.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub label: String,
    /// Percentage in [0, 100], rounded to two decimals.
    pub confidence: f64,
    /// [x1, y1, x2, y2] in absolute pixels.
    pub bbox: [f32; 4],
}

impl From<&DetectedObject> for Detection {
    fn from(obj: &DetectedObject) -> Self {
        Self {
            label: obj.label.clone(),
            confidence: percent(obj.confidence),
            bbox: obj.bbox,
        }
    }
}

/// Scale a [0, 1] confidence to a percentage rounded to two decimals.
fn percent(confidence: f32) -> f64 {
    (f64::from(confidence) * 10_000.0).round() / 100.0
}

pub(crate) fn to_detections(objects: &[DetectedObject]) -> Vec<Detection> {
    objects.iter().map(Detection::from).collect()
}
