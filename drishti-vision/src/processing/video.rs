//! Frame-by-frame video detection and re-encoding

use crate::annotate;
use crate::error::VisionError;
use crate::models::ActiveModel;
use crate::processing::{to_detections, Detection};
use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use std::path::Path;
use tracing::{debug, info};

/// Run the detector over every frame, writing an annotated copy to `dest`.
///
/// Only the first frame's detections are reported; later frames are
/// annotated but their detections are discarded. Decoder and encoder are
/// released before returning, success or not, so a failed run may leave a
/// partially written output file behind.
pub fn process(
    model: &ActiveModel,
    source: &Path,
    dest: &Path,
) -> Result<Vec<Detection>, VisionError> {
    let source_str = source
        .to_str()
        .ok_or_else(|| VisionError::Decode("Video path is not valid UTF-8".to_string()))?;
    let dest_str = dest
        .to_str()
        .ok_or_else(|| VisionError::Encode("Output path is not valid UTF-8".to_string()))?;

    let mut capture = VideoCapture::from_file(source_str, videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        return Err(VisionError::Decode(format!("Cannot open video {source_str}")));
    }

    let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
    let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
    let fps = capture.get(videoio::CAP_PROP_FPS)?;
    if width <= 0 || height <= 0 {
        let _ = capture.release();
        return Err(VisionError::Decode(format!(
            "Invalid video dimensions {width}x{height}"
        )));
    }
    // Some containers report zero fps; fall back so the writer still opens.
    let fps = if fps > 0.0 { fps } else { 30.0 };

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let mut writer = match VideoWriter::new(dest_str, fourcc, fps, Size::new(width, height), true) {
        Ok(writer) => writer,
        Err(e) => {
            let _ = capture.release();
            return Err(e.into());
        }
    };
    if !writer.is_opened().unwrap_or(false) {
        let _ = capture.release();
        return Err(VisionError::Encode(format!(
            "Cannot open video writer for {dest_str}"
        )));
    }

    let result = annotate_frames(model, &mut capture, &mut writer);

    // Release both ends before responding, even on failure.
    let _ = capture.release();
    let _ = writer.release();

    if result.is_ok() {
        info!("Processed video saved: {}", dest_str);
    }
    result
}

fn annotate_frames(
    model: &ActiveModel,
    capture: &mut VideoCapture,
    writer: &mut VideoWriter,
) -> Result<Vec<Detection>, VisionError> {
    let mut first_frame_detections = Vec::new();
    let mut frame = Mat::default();
    let mut frame_index = 0usize;

    while capture.read(&mut frame)? {
        if frame.empty() {
            break;
        }
        let objects = model.detector.detect(&frame)?;
        if frame_index == 0 {
            first_frame_detections = to_detections(&objects);
        }
        annotate::draw_detections(&mut frame, &objects)?;
        writer.write(&frame)?;
        frame_index += 1;
    }

    debug!("Annotated {} video frames", frame_index);
    Ok(first_frame_detections)
}
