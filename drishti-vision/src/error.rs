//! Error types for drishti-vision

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    /// Request input the caller can fix: bad filename, unsupported media type.
    #[error("{0}")]
    InvalidInput(String),

    /// No detector handle has been loaded yet.
    #[error("YOLO model not available")]
    ModelUnavailable,

    #[error("Model error: {0}")]
    Model(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ONNX Runtime error: {0}")]
    Ort(String),

    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = VisionError::InvalidInput("Unsupported file type".to_string());
        assert_eq!(err.to_string(), "Unsupported file type");
    }

    #[test]
    fn test_model_unavailable_display() {
        let err = VisionError::ModelUnavailable;
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: VisionError = io_err.into();
        match err {
            VisionError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_all_error_variants() {
        let _ = VisionError::InvalidInput("input".to_string());
        let _ = VisionError::Model("model".to_string());
        let _ = VisionError::Decode("decode".to_string());
        let _ = VisionError::Encode("encode".to_string());
        let _ = VisionError::Ort("ort".to_string());
        let _ = VisionError::OpenCv("opencv".to_string());
    }
}
