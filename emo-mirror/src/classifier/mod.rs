//! Classifier boundary
//!
//! The emotion model is an external, asynchronous collaborator. Everything
//! downstream talks to it through [`EmotionClassifier`], so a real model, a
//! remote API or on-device inference can replace [`MockClassifier`] without
//! touching normalization, ranking or the consumers.

mod mock;

pub use mock::MockClassifier;

use async_trait::async_trait;
use emo_common::{EmotionScore, Error, Result};
use std::path::Path;

/// Opaque encoded image produced by the capture/upload collaborators
///
/// Only `image/*` payloads are accepted; the bytes are never decoded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    mime_type: String,
    bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into().trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(Error::InvalidImage(format!(
                "expected an image/* type, got '{}'",
                mime_type
            )));
        }
        if bytes.is_empty() {
            return Err(Error::InvalidImage("image payload is empty".to_string()));
        }
        Ok(Self { mime_type, bytes })
    }

    /// Parse a `data:image/...;base64,...` URI as produced by a canvas or file reader
    ///
    /// The payload after the comma is kept verbatim (still encoded).
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidImage("not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidImage("data URI has no payload".to_string()))?;
        let mime_type = header.split(';').next().unwrap_or_default();
        Self::new(mime_type, payload.as_bytes().to_vec())
    }

    /// Read an image file, inferring the MIME type from its extension
    pub async fn from_file(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            _ => {
                return Err(Error::InvalidImage(format!(
                    "unsupported image file: {}",
                    path.display()
                )))
            }
        };
        let bytes = tokio::fs::read(path).await?;
        Self::new(mime_type, bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Asynchronous emotion classifier
///
/// Returns one raw score per label. Scores are expected in `[0, ~1]` but need
/// not sum to 1. Implementations do not retry; retry policy belongs to the
/// caller.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classifier identifier for logging (e.g., "mock", "onnx")
    fn name(&self) -> &'static str;

    /// Classify one image
    ///
    /// # Errors
    /// [`Error::ClassifierFailure`] on any I/O or model error.
    async fn analyze(&self, image: &ImageData) -> Result<Vec<EmotionScore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_accepted() {
        let image = ImageData::from_data_uri("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.bytes(), b"/9j/4AAQSkZJRg==");
    }

    #[test]
    fn test_non_image_data_uri_rejected() {
        let err = ImageData::from_data_uri("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            ImageData::from_data_uri("data:image/png;base64,"),
            Err(Error::InvalidImage(_))
        ));
        assert!(matches!(
            ImageData::from_data_uri("image/png;base64,AAAA"),
            Err(Error::InvalidImage(_))
        ));
    }

    #[test]
    fn test_mime_type_normalized() {
        let image = ImageData::new(" Image/PNG ", vec![0x89, 0x50]).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.len(), 2);
    }

    #[tokio::test]
    async fn test_from_file_rejects_unknown_extension() {
        let err = ImageData::from_file(Path::new("/tmp/face.txt")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }
}
