//! The fixed time-table layout: Date, Activity, In, Out.
//!
//! Marker detection yields one column fewer than the layout has. The last
//! raw column holds both time columns and is split at its midpoint; the
//! first raw column carries a leading margin and keeps only its left half.

use crate::error::ScanError;
use crate::model::{Col, Skeleton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Activity,
    In,
    Out,
}

impl Column {
    pub const COUNT: usize = 4;

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Date),
            1 => Some(Self::Activity),
            2 => Some(Self::In),
            3 => Some(Self::Out),
            _ => None,
        }
    }
}

pub(crate) fn halve(col: Col) -> Col {
    Col {
        right: col.left + (col.right - col.left) / 2,
        ..col
    }
}

pub(crate) fn split(col: Col) -> [Col; 2] {
    let size = col.right - col.left;
    let first = Col {
        num: col.num,
        left: col.left,
        right: col.right - size / 2,
    };
    let second = Col {
        num: col.num + 1,
        left: first.right,
        right: col.right,
    };
    [first, second]
}

/// Maps raw divider-derived columns onto the four logical columns.
pub fn reconcile_columns(raw: &[Col]) -> Result<Vec<Col>, ScanError> {
    let Some((last, rest)) = raw.split_last() else {
        return Err(ScanError::GridNotFound("no columns to reconcile".to_string()));
    };
    if raw.len() + 1 != Column::COUNT {
        return Err(ScanError::GridNotFound(format!(
            "expected {} raw columns, found {}",
            Column::COUNT - 1,
            raw.len()
        )));
    }

    if let Some(col) = raw.iter().find(|col| col.right < col.left) {
        return Err(ScanError::GridNotFound(format!(
            "column {} ends at {} before it starts at {}",
            col.num, col.right, col.left
        )));
    }

    let mut cols = rest.to_vec();
    cols[0] = halve(cols[0]);
    cols.extend(split(*last));
    Ok(cols)
}

impl Skeleton {
    /// Applies [`reconcile_columns`] to this skeleton's columns.
    pub fn reconciled(&self) -> Result<Self, ScanError> {
        Ok(Self {
            cols: reconcile_columns(&self.cols)?,
            ..self.clone()
        })
    }
}
