use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub(crate) const PRETTY_DATE: &str = "%d/%m";
pub(crate) const PRETTY_TIME: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Col => f.write_str("column"),
        }
    }
}

/// Pixel position in the decoded source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Vertical span of one table row, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Row {
    pub num: usize,
    pub top: u32,
    pub bottom: u32,
}

/// Horizontal span of one table column, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Col {
    pub num: usize,
    pub left: u32,
    pub right: u32,
}

/// Detected grid geometry of one table image.
///
/// `origin` is where this skeleton's `(0, 0)` sits in the source image, so
/// rebasing is always expressed against absolute source coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skeleton {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<Row>,
    pub cols: Vec<Col>,
    pub origin: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectionKind {
    Word,
    Line,
    #[serde(other)]
    Other,
}

/// One OCR hit; geometry is expressed as fractions of the image size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDetection {
    pub text: String,
    pub kind: DetectionKind,
    pub bounding_box: BoundingBox,
}

impl TextDetection {
    #[must_use]
    pub fn word(text: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            text: text.into(),
            kind: DetectionKind::Word,
            bounding_box,
        }
    }
}

/// One reconstructed row of the time-table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub date: Option<NaiveDate>,
    pub activity: String,
    pub in_time: Option<NaiveDateTime>,
    pub out_time: Option<NaiveDateTime>,
}

impl Entry {
    #[must_use]
    pub fn date_label(&self) -> String {
        self.date.map_or_else(
            || "--/--".to_string(),
            |date| date.format(PRETTY_DATE).to_string(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub problems: Vec<String>,
    pub fixes: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}
