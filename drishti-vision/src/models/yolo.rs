//! YOLO object detection model

use crate::error::VisionError;
use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::*;
use ort::session::Session;
use ort::value::Value;
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, info};

/// COCO class names (80 classes)
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator",
    "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

const CONFIDENCE_THRESHOLD: f32 = 0.5;
const NMS_IOU_THRESHOLD: f32 = 0.4;

/// Detected object in absolute pixel coordinates.
#[derive(Debug, Clone)]
pub struct DetectedObject {
    pub class_id: usize,
    pub label: String,
    /// Score in [0, 1].
    pub confidence: f32,
    /// [x1, y1, x2, y2]
    pub bbox: [f32; 4],
}

/// YOLO model for object detection
pub struct YoloModel {
    session: Mutex<Session>,
    input_size: (u32, u32),
}

impl YoloModel {
    /// Load a model from an `.onnx` file.
    pub fn new(model_path: &Path) -> Result<Self, VisionError> {
        let session = Session::builder()
            .map_err(|e| VisionError::Ort(format!("Failed to create session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| VisionError::Ort(format!("Failed to load YOLO model: {e}")))?;

        info!("YOLO model loaded from {:?}", model_path);

        Ok(Self {
            session: Mutex::new(session),
            // YOLO standard input size
            input_size: (640, 640),
        })
    }

    /// Detect objects in a BGR frame.
    pub fn detect(&self, frame: &Mat) -> Result<Vec<DetectedObject>, VisionError> {
        debug!("Running YOLO detection on frame");

        let chw = self.preprocess(frame)?;
        let (width, height) = self.input_size;
        let input = Value::from_array(([1usize, 3, height as usize, width as usize], chw))
            .map_err(|e| VisionError::Ort(format!("Failed to build input tensor: {e}")))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::Ort(format!("YOLO inference failed: {e}")))?;
        let output = outputs
            .get("output0")
            .or_else(|| outputs.get("output"))
            .ok_or_else(|| VisionError::Ort("Model has no output tensor".to_string()))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::Ort(format!("Failed to extract output tensor: {e}")))?;
        let dims: Vec<i64> = shape.iter().copied().collect();

        let detections = self.postprocess(&dims, data, frame)?;
        debug!("YOLO detected {} objects", detections.len());
        Ok(detections)
    }

    /// Resize to the model input size and repack BGR u8 pixels as a
    /// normalized CHW float tensor.
    fn preprocess(&self, frame: &Mat) -> Result<Vec<f32>, VisionError> {
        let (width, height) = (self.input_size.0 as i32, self.input_size.1 as i32);

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| VisionError::OpenCv(format!("Failed to resize frame: {e}")))?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| VisionError::OpenCv(format!("Failed to convert color: {e}")))?;

        let bytes = rgb
            .data_bytes()
            .map_err(|e| VisionError::OpenCv(format!("Failed to read frame data: {e}")))?;
        let channels = rgb.channels() as usize;
        let (w, h) = (width as usize, height as usize);
        if channels != 3 || bytes.len() < w * h * 3 {
            return Err(VisionError::OpenCv(format!(
                "Unexpected frame layout: {channels} channels, {} bytes",
                bytes.len()
            )));
        }

        let mut chw = vec![0.0f32; 3 * h * w];
        for y in 0..h {
            for x in 0..w {
                let src = (y * w + x) * 3;
                for c in 0..3 {
                    chw[c * h * w + y * w + x] = f32::from(bytes[src + c]) / 255.0;
                }
            }
        }
        Ok(chw)
    }

    /// Turn the raw output tensor into detections scaled to the original
    /// frame. Handles both anchors-last ([1, attrs, N], Ultralytics v8+
    /// exports) and anchors-first ([1, N, attrs]) layouts.
    fn postprocess(
        &self,
        dims: &[i64],
        data: &[f32],
        frame: &Mat,
    ) -> Result<Vec<DetectedObject>, VisionError> {
        if dims.len() != 3 || dims[0] != 1 {
            return Err(VisionError::Ort(format!("Unexpected output shape: {dims:?}")));
        }
        let (d1, d2) = (dims[1] as usize, dims[2] as usize);
        let transposed = d1 < d2;
        let (num_attrs, num_anchors) = if transposed { (d1, d2) } else { (d2, d1) };
        if num_attrs < 5 || data.len() < num_attrs * num_anchors {
            return Err(VisionError::Ort(format!("Unexpected output shape: {dims:?}")));
        }
        let num_classes = num_attrs - 4;

        let at = |attr: usize, anchor: usize| -> f32 {
            if transposed {
                data[attr * num_anchors + anchor]
            } else {
                data[anchor * num_attrs + attr]
            }
        };

        let frame_width = frame.cols() as f32;
        let frame_height = frame.rows() as f32;
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return Ok(vec![]);
        }
        let scale_x = frame_width / self.input_size.0 as f32;
        let scale_y = frame_height / self.input_size.1 as f32;

        let mut detections = Vec::new();
        for i in 0..num_anchors {
            let mut best_class = 0usize;
            let mut best_score = 0.0f32;
            for c in 0..num_classes {
                let score = at(4 + c, i);
                if score > best_score {
                    best_score = score;
                    best_class = c;
                }
            }
            if !best_score.is_finite() || best_score < CONFIDENCE_THRESHOLD {
                continue;
            }

            let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
            if ![cx, cy, w, h].iter().all(|v| v.is_finite()) || w <= 0.0 || h <= 0.0 {
                continue;
            }

            let x1 = ((cx - w / 2.0) * scale_x).clamp(0.0, frame_width);
            let y1 = ((cy - h / 2.0) * scale_y).clamp(0.0, frame_height);
            let x2 = ((cx + w / 2.0) * scale_x).clamp(0.0, frame_width);
            let y2 = ((cy + h / 2.0) * scale_y).clamp(0.0, frame_height);
            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            let label = COCO_CLASSES
                .get(best_class)
                .copied()
                .unwrap_or("object")
                .to_string();
            detections.push(DetectedObject {
                class_id: best_class,
                label,
                confidence: best_score.min(1.0),
                bbox: [x1, y1, x2, y2],
            });
        }

        Ok(apply_nms(detections, NMS_IOU_THRESHOLD))
    }
}

/// Non-maximum suppression over xyxy boxes, highest confidence first.
fn apply_nms(mut detections: Vec<DetectedObject>, iou_threshold: f32) -> Vec<DetectedObject> {
    detections.retain(|d| d.confidence.is_finite());
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];
    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        for j in (i + 1)..detections.len() {
            if !suppressed[j] && iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
        keep.push(detections[i].clone());
    }
    keep
}

/// Intersection over union of two xyxy boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_x1 = a[0].max(b[0]);
    let inter_y1 = a[1].max(b[1]);
    let inter_x2 = a[2].min(b[2]);
    let inter_y2 = a[3].min(b[3]);
    if inter_x2 <= inter_x1 || inter_y2 <= inter_y1 {
        return 0.0;
    }

    let inter = (inter_x2 - inter_x1) * (inter_y2 - inter_y1);
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    let union = area_a + area_b - inter;
    if union <= 0.0 || !union.is_finite() {
        return 0.0;
    }
    (inter / union).clamp(0.0, 1.0)
}
