use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::model::TextDetection;

/// Side channel for keeping the inputs of a failed scan around.
///
/// `detections` is exactly what the [`crate::TextDetector`] returned, before
/// any filtering. Adapters that normalise a provider response (such as
/// [`crate::RecordedDetections`]) have already dropped entries without text
/// or geometry; keep the provider document yourself if those matter.
pub trait DebugSink {
    fn persist(
        &self,
        message_id: &str,
        png: &[u8],
        detections: &[TextDetection],
    ) -> Result<(), ScanError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DebugSink for NoopSink {
    fn persist(&self, _: &str, _: &[u8], _: &[TextDetection]) -> Result<(), ScanError> {
        Ok(())
    }
}

fn debug_key(message_id: &str, suffix: &str) -> String {
    format!("{}-{suffix}", urlencoding::encode(message_id))
}

/// Writes `<id>-debug-img.png` and `<id>-debug-ocr.json` into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn image_path(&self, message_id: &str) -> PathBuf {
        self.root.join(debug_key(message_id, "debug-img.png"))
    }

    #[must_use]
    pub fn detections_path(&self, message_id: &str) -> PathBuf {
        self.root.join(debug_key(message_id, "debug-ocr.json"))
    }
}

impl DebugSink for DirectorySink {
    fn persist(
        &self,
        message_id: &str,
        png: &[u8],
        detections: &[TextDetection],
    ) -> Result<(), ScanError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.image_path(message_id), png)?;
        let json = serde_json::to_vec_pretty(detections)?;
        fs::write(self.detections_path(message_id), json)?;
        tracing::info!(message_id, root = %self.root.display(), "persisted debug artifacts");
        Ok(())
    }
}
