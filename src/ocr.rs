use std::path::Path;

use serde::Deserialize;

use crate::error::ScanError;
use crate::model::{BoundingBox, DetectionKind, TextDetection};

/// The OCR collaborator: cleaned PNG bytes in, unordered detections out.
///
/// Called exactly once per scan; retries and timeouts belong to the caller.
pub trait TextDetector {
    fn detect_text(&self, png: &[u8]) -> Result<Vec<TextDetection>, ScanError>;
}

impl<F> TextDetector for F
where
    F: Fn(&[u8]) -> Result<Vec<TextDetection>, ScanError>,
{
    fn detect_text(&self, png: &[u8]) -> Result<Vec<TextDetection>, ScanError> {
        self(png)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectTextOutput {
    #[serde(default)]
    text_detections: Vec<RawDetection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDetection {
    detected_text: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<DetectionKind>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGeometry {
    bounding_box: Option<RawBoundingBox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBoundingBox {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordedDocument {
    Rekognition(DetectTextOutput),
    Plain(Vec<TextDetection>),
}

impl RawDetection {
    fn into_detection(self) -> Option<TextDetection> {
        let bounding_box = self.geometry?.bounding_box?;
        Some(TextDetection {
            text: self.detected_text?,
            kind: self.kind.unwrap_or(DetectionKind::Other),
            bounding_box: BoundingBox {
                left: bounding_box.left,
                top: bounding_box.top,
                width: bounding_box.width,
                height: bounding_box.height,
            },
        })
    }
}

/// Replays a saved OCR response instead of calling a live service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedDetections {
    detections: Vec<TextDetection>,
}

impl RecordedDetections {
    #[must_use]
    pub fn new(detections: Vec<TextDetection>) -> Self {
        Self { detections }
    }

    /// Accepts a `DetectText` response document or a plain detection list.
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        let detections = match serde_json::from_str::<RecordedDocument>(json)? {
            RecordedDocument::Rekognition(output) => {
                let total = output.text_detections.len();
                let detections = output
                    .text_detections
                    .into_iter()
                    .filter_map(RawDetection::into_detection)
                    .collect::<Vec<_>>();
                if detections.len() < total {
                    tracing::debug!(
                        skipped = total - detections.len(),
                        "recorded detections without text or geometry"
                    );
                }
                detections
            }
            RecordedDocument::Plain(detections) => detections,
        };
        Ok(Self { detections })
    }

    pub fn from_path(path: &Path) -> Result<Self, ScanError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn detections(&self) -> &[TextDetection] {
        &self.detections
    }
}

impl TextDetector for RecordedDetections {
    fn detect_text(&self, _png: &[u8]) -> Result<Vec<TextDetection>, ScanError> {
        Ok(self.detections.clone())
    }
}
