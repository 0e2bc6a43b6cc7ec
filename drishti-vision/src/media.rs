//! Uploaded-media classification and filename hygiene

use crate::error::VisionError;
use std::path::Path;

/// Recognized image extensions, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Recognized video extensions, matched case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// How an uploaded file will be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Classify a filename by its extension.
pub fn classify(filename: &str) -> Result<MediaKind, VisionError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(MediaKind::Video)
    } else {
        Err(VisionError::InvalidInput("Unsupported file type".to_string()))
    }
}

/// Validate a client-supplied filename before it touches the filesystem.
///
/// Rejects empty names, path separators, parent-directory components, and
/// control characters.
pub fn sanitize_filename(filename: &str) -> Result<String, VisionError> {
    let name = filename.trim();
    if name.is_empty() || name.len() > 255 {
        return Err(VisionError::InvalidInput("Invalid filename".to_string()));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(VisionError::InvalidInput("Invalid filename".to_string()));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(VisionError::InvalidInput("Invalid filename".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_images() {
        for name in ["a.png", "a.jpg", "a.jpeg", "a.bmp", "a.gif", "A.PNG", "photo.JPeG"] {
            assert_eq!(classify(name).unwrap(), MediaKind::Image, "{name}");
        }
    }

    #[test]
    fn test_classify_videos() {
        for name in ["a.mp4", "a.avi", "a.mov", "a.mkv", "CLIP.MP4"] {
            assert_eq!(classify(name).unwrap(), MediaKind::Video, "{name}");
        }
    }

    #[test]
    fn test_classify_unsupported() {
        for name in ["a.txt", "a.pdf", "archive.tar.gz", "noext", "a."] {
            assert!(classify(name).is_err(), "{name}");
        }
    }

    #[test]
    fn test_classify_unsupported_message() {
        let err = classify("notes.txt").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type");
    }

    #[test]
    fn test_sanitize_accepts_plain_names() {
        assert_eq!(sanitize_filename("t.png").unwrap(), "t.png");
        assert_eq!(sanitize_filename("my clip 1.mp4").unwrap(), "my clip 1.mp4");
        assert_eq!(sanitize_filename("  padded.jpg  ").unwrap(), "padded.jpg");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("..\\boot.ini").is_err());
        assert!(sanitize_filename("a/b.png").is_err());
        assert!(sanitize_filename("evil..png").is_err());
    }

    #[test]
    fn test_sanitize_rejects_empty_and_control() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("   ").is_err());
        assert!(sanitize_filename("a\0b.png").is_err());
        assert!(sanitize_filename("a\nb.png").is_err());
        assert!(sanitize_filename(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_media_kind_as_str() {
        assert_eq!(MediaKind::Image.as_str(), "image");
        assert_eq!(MediaKind::Video.as_str(), "video");
    }
}
