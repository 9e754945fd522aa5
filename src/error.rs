use std::io;

use thiserror::Error;

use crate::model::Axis;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("first row not found")]
    RowOriginNotFound,

    #[error("first col not found on row {row}")]
    ColOriginNotFound { row: u32 },

    #[error("table grid not found: {0}")]
    GridNotFound(String),

    #[error("unexpected date format: {0:?}")]
    UnrecognizedDateFormat(String),

    #[error("failed to parse date {text:?}: {source}")]
    DateParse {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to parse time {text:?} for date {date:?}")]
    TimeParseFailure { date: String, text: String },

    #[error("no {axis} contains coordinate {coordinate}")]
    CellLookupMiss { axis: Axis, coordinate: i64 },

    #[error("cannot build a fix: {0}")]
    AmbiguousEntry(String),

    #[error("OCR collaborator failed: {0}")]
    Ocr(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("failed to locate the table grid for {message_id}: {source}")]
    GridScan {
        message_id: String,
        #[source]
        source: Box<ScanError>,
    },

    #[error("failed to parse entries for {message_id}: {source}")]
    EntryScan {
        message_id: String,
        #[source]
        source: Box<ScanError>,
    },
}

impl ScanError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::Csv(_) => "csv_error",
            Self::Image(_) => "image_error",
            Self::Json(_) => "json_error",
            Self::RowOriginNotFound => "row_origin_not_found",
            Self::ColOriginNotFound { .. } => "col_origin_not_found",
            Self::GridNotFound(_) => "grid_not_found",
            Self::UnrecognizedDateFormat(_) | Self::DateParse { .. } => "unrecognized_date_format",
            Self::TimeParseFailure { .. } => "time_parse_failure",
            Self::CellLookupMiss { .. } => "cell_lookup_miss",
            Self::AmbiguousEntry(_) => "ambiguous_entry",
            Self::Ocr(_) => "ocr_error",
            Self::InvalidOption(_) => "invalid_option",
            Self::GridScan { source, .. } | Self::EntryScan { source, .. } => source.code(),
        }
    }

    /// Structural failures mean the image is not a readable time-table.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        match self {
            Self::RowOriginNotFound
            | Self::ColOriginNotFound { .. }
            | Self::GridNotFound(_)
            | Self::UnrecognizedDateFormat(_)
            | Self::DateParse { .. }
            | Self::TimeParseFailure { .. } => true,
            Self::GridScan { source, .. } | Self::EntryScan { source, .. } => {
                source.is_structural()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScanError;

    #[test]
    fn entry_scan_reports_inner_code() {
        let error = ScanError::EntryScan {
            message_id: "msg-1".to_string(),
            source: Box::new(ScanError::UnrecognizedDateFormat("Date".to_string())),
        };
        assert_eq!(error.code(), "unrecognized_date_format");
        assert!(error.is_structural());
        assert!(error.to_string().contains("msg-1"));
    }

    #[test]
    fn grid_scan_delegates_to_detection_failure() {
        let error = ScanError::GridScan {
            message_id: "msg-2".to_string(),
            source: Box::new(ScanError::RowOriginNotFound),
        };
        assert_eq!(error.code(), "row_origin_not_found");
        assert!(error.is_structural());
        assert!(error.to_string().contains("msg-2"));
    }

    #[test]
    fn ambiguous_entry_is_not_structural() {
        let error = ScanError::AmbiguousEntry("both times are empty".to_string());
        assert!(!error.is_structural());
    }
}
