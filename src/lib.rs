mod analytics;
mod assign;
mod csv_out;
mod debug_sink;
mod error;
mod grid_detect;
mod model;
mod ocr;
mod options;
mod parse;
mod render;
mod schema;
mod skeleton;
mod warning;

use image::RgbaImage;

pub use analytics::{
    MISSING_REPORT, UNCLOSED_DAY, average, average_in, average_out, build_report, fix_entry,
};
pub use assign::{Assignment, assign_cells, scan};
pub use csv_out::{entries_to_csv_string, write_entries_csv};
pub use debug_sink::{DebugSink, DirectorySink, NoopSink};
pub use error::ScanError;
pub use grid_detect::GridDetector;
pub use model::{
    Axis, BoundingBox, Col, DetectionKind, Entry, Point, Report, Row, Skeleton, TextDetection,
};
pub use ocr::{RecordedDetections, TextDetector};
pub use options::{AnalyticsOptions, ColorSpec, GridOptions, ScanOptions, parse_clock};
pub use parse::{parse_date, parse_time};
pub use render::{Rendered, render};
pub use schema::{Column, reconcile_columns};
pub use warning::{ScanWarning, WarningCode};

/// Cleaned OCR input plus the grid expressed in its coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primed {
    pub png: Vec<u8>,
    pub skeleton: Skeleton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub report: Report,
    pub entries: Vec<Entry>,
    pub warnings: Vec<ScanWarning>,
    pub skeleton: Skeleton,
}

impl ScanOutcome {
    #[must_use]
    pub fn has_dated_rows(&self) -> bool {
        self.entries.iter().any(|entry| entry.date.is_some())
    }
}

/// Detects the grid, renders the OCR image and maps the grid onto it.
///
/// The raw skeleton drives line erasure and cropping; the returned one is
/// rebased to the crop and reconciled to the four logical columns.
pub fn prime(image: &RgbaImage, options: &GridOptions) -> Result<Primed, ScanError> {
    let raw = GridDetector::new(options.clone()).detect(image)?;
    let rendered = render(image, &raw, options.background)?;

    let skeleton = Skeleton {
        width: rendered.width,
        height: rendered.height,
        ..raw.rebased()
    }
    .reconciled()?;

    Ok(Primed {
        png: rendered.png,
        skeleton,
    })
}

fn assignment_warnings(assignment: &Assignment) -> Vec<ScanWarning> {
    let mut warnings = Vec::new();
    if assignment.non_words > 0 {
        warnings.push(
            ScanWarning::new(WarningCode::NonWordDetections, "ignored non-word detections")
                .with_count(assignment.non_words),
        );
    }
    if assignment.discarded > 0 {
        warnings.push(
            ScanWarning::new(
                WarningCode::DetectionsDiscarded,
                "detections outside every table cell were dropped",
            )
            .with_count(assignment.discarded),
        );
    }
    if !assignment.entries.iter().any(|entry| entry.date.is_some()) {
        warnings.push(ScanWarning::new(
            WarningCode::NoDatedRows,
            "no row carries a recognisable date",
        ));
    }
    warnings
}

/// Runs the full pipeline on a decoded image.
///
/// Grid failures come back as [`ScanError::GridScan`] tagged with
/// `message_id`. The OCR collaborator is called once. When its output cannot
/// be mapped onto the grid, the cleaned image and detections go to `sink`
/// before the error is returned as [`ScanError::EntryScan`].
pub fn analyze_image(
    message_id: &str,
    image: &RgbaImage,
    detector: &dyn TextDetector,
    sink: &dyn DebugSink,
    options: &ScanOptions,
) -> Result<ScanOutcome, ScanError> {
    options.validate()?;

    let primed = prime(image, &options.grid).map_err(|error| ScanError::GridScan {
        message_id: message_id.to_string(),
        source: Box::new(error),
    })?;
    let detections = detector.detect_text(&primed.png)?;
    tracing::debug!(message_id, detections = detections.len(), "OCR returned");

    let assignment = match assign_cells(&detections, &primed.skeleton) {
        Ok(assignment) => assignment,
        Err(error) => {
            if let Err(sink_error) = sink.persist(message_id, &primed.png, &detections) {
                tracing::warn!(message_id, %sink_error, "failed to persist debug artifacts");
            }
            return Err(ScanError::EntryScan {
                message_id: message_id.to_string(),
                source: Box::new(error),
            });
        }
    };

    let mut warnings = assignment_warnings(&assignment);
    let (report, fix_warnings) = build_report(&assignment.entries, &options.analytics);
    warnings.extend(fix_warnings);

    tracing::info!(
        message_id,
        rows = assignment.entries.len(),
        problems = report.problems.len(),
        fixes = report.fixes.len(),
        "time-table scan completed"
    );

    Ok(ScanOutcome {
        report,
        entries: assignment.entries,
        warnings,
        skeleton: primed.skeleton,
    })
}

/// Decodes PNG bytes and runs [`analyze_image`].
pub fn analyze(
    message_id: &str,
    png: &[u8],
    detector: &dyn TextDetector,
    sink: &dyn DebugSink,
    options: &ScanOptions,
) -> Result<ScanOutcome, ScanError> {
    let image = image::load_from_memory(png)?.to_rgba8();
    analyze_image(message_id, &image, detector, sink, options)
}
