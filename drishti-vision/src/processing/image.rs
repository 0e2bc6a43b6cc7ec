//! Single-image detection and annotation

use crate::annotate;
use crate::error::VisionError;
use crate::models::ActiveModel;
use crate::processing::{to_detections, Detection};
use opencv::core::Vector;
use opencv::imgcodecs;
use opencv::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Run the detector once over an image and write the annotated copy to
/// `dest`, overwriting any prior file of that name.
pub fn process(
    model: &ActiveModel,
    source: &Path,
    dest: &Path,
) -> Result<Vec<Detection>, VisionError> {
    let source_str = source
        .to_str()
        .ok_or_else(|| VisionError::Decode("Image path is not valid UTF-8".to_string()))?;
    let dest_str = dest
        .to_str()
        .ok_or_else(|| VisionError::Encode("Output path is not valid UTF-8".to_string()))?;

    let mut frame = imgcodecs::imread(source_str, imgcodecs::IMREAD_COLOR)?;
    if frame.empty() {
        return Err(VisionError::Decode(format!("Cannot decode image {source_str}")));
    }

    let objects = model.detector.detect(&frame)?;
    debug!("Number of detections: {}", objects.len());
    let detections = to_detections(&objects);

    annotate::draw_detections(&mut frame, &objects)?;

    let written = imgcodecs::imwrite(dest_str, &frame, &Vector::new())?;
    if !written {
        return Err(VisionError::Encode(format!("Cannot write image {dest_str}")));
    }

    info!("Processed image saved: {}", dest_str);
    Ok(detections)
}
