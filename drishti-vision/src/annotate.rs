//! Bounding-box rendering on BGR frames

use crate::error::VisionError;
use crate::models::DetectedObject;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;

/// Box colors (BGR), indexed by class id modulo the palette length.
const PALETTE: &[(f64, f64, f64)] = &[
    (56.0, 56.0, 255.0),
    (151.0, 157.0, 255.0),
    (31.0, 112.0, 255.0),
    (29.0, 178.0, 255.0),
    (49.0, 210.0, 207.0),
    (10.0, 249.0, 72.0),
    (23.0, 204.0, 146.0),
    (134.0, 219.0, 61.0),
    (52.0, 147.0, 26.0),
    (187.0, 212.0, 0.0),
];

fn class_color(class_id: usize) -> Scalar {
    let (b, g, r) = PALETTE[class_id % PALETTE.len()];
    Scalar::new(b, g, r, 0.0)
}

/// Draw labeled boxes onto `frame` in place.
pub fn draw_detections(frame: &mut Mat, detections: &[DetectedObject]) -> Result<(), VisionError> {
    for det in detections {
        let [x1, y1, x2, y2] = det.bbox;
        let rect = Rect::new(
            x1 as i32,
            y1 as i32,
            ((x2 - x1) as i32).max(1),
            ((y2 - y1) as i32).max(1),
        );
        let color = class_color(det.class_id);
        imgproc::rectangle(frame, rect, color, 2, imgproc::LINE_8, 0)?;

        let label = format!("{} {:.2}", det.label, det.confidence);
        let mut baseline = 0;
        let text_size = imgproc::get_text_size(
            &label,
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            1,
            &mut baseline,
        )?;

        // Filled label background above the box, clamped into the frame.
        let text_top = (rect.y - text_size.height - 4).max(0);
        let background = Rect::new(rect.x, text_top, text_size.width + 4, text_size.height + 4);
        imgproc::rectangle(frame, background, color, imgproc::FILLED, imgproc::LINE_8, 0)?;
        imgproc::put_text(
            frame,
            &label,
            Point::new(rect.x + 2, text_top + text_size.height + 1),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(255.0, 255.0, 255.0, 0.0),
            1,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}
