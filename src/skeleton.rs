use crate::error::ScanError;
use crate::model::{Axis, Col, Point, Row, Skeleton};

pub(crate) fn find_row(rows: &[Row], y: i64) -> Result<usize, ScanError> {
    rows.iter()
        .find(|row| y >= i64::from(row.top) && y <= i64::from(row.bottom))
        .map(|row| row.num)
        .ok_or(ScanError::CellLookupMiss {
            axis: Axis::Row,
            coordinate: y,
        })
}

pub(crate) fn find_col(cols: &[Col], x: i64) -> Result<usize, ScanError> {
    cols.iter()
        .find(|col| x >= i64::from(col.left) && x <= i64::from(col.right))
        .map(|col| col.num)
        .ok_or(ScanError::CellLookupMiss {
            axis: Axis::Col,
            coordinate: x,
        })
}

impl Skeleton {
    /// Row number containing `y`; boundaries are shared, the upper row wins.
    pub fn row_at(&self, y: i64) -> Result<usize, ScanError> {
        find_row(&self.rows, y)
    }

    /// Column number containing `x`; boundaries are shared, the left column wins.
    pub fn col_at(&self, x: i64) -> Result<usize, ScanError> {
        find_col(&self.cols, x)
    }

    /// Re-expresses the geometry relative to `origin`, given in source-image
    /// coordinates. Returns `None` when `origin` lies past the first row or
    /// column, which would push coordinates below zero.
    #[must_use]
    pub fn shifted_to(&self, origin: Point) -> Option<Self> {
        let min_x = self.cols.first().map_or(0, |col| col.left) + self.origin.x;
        let min_y = self.rows.first().map_or(0, |row| row.top) + self.origin.y;
        if origin.x > min_x || origin.y > min_y {
            return None;
        }
        Some(self.translate(origin))
    }

    /// Moves the frame so the first row and column start at zero.
    #[must_use]
    pub fn rebased(&self) -> Self {
        let origin = Point {
            x: self.origin.x + self.cols.first().map_or(0, |col| col.left),
            y: self.origin.y + self.rows.first().map_or(0, |row| row.top),
        };
        self.translate(origin)
    }

    fn translate(&self, origin: Point) -> Self {
        let dx = |value: u32| (value + self.origin.x).saturating_sub(origin.x);
        let dy = |value: u32| (value + self.origin.y).saturating_sub(origin.y);

        Self {
            width: self.width,
            height: self.height,
            rows: self
                .rows
                .iter()
                .map(|row| Row {
                    num: row.num,
                    top: dy(row.top),
                    bottom: dy(row.bottom),
                })
                .collect(),
            cols: self
                .cols
                .iter()
                .map(|col| Col {
                    num: col.num,
                    left: dx(col.left),
                    right: dx(col.right),
                })
                .collect(),
            origin,
        }
    }
}
