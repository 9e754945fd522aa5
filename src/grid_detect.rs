use image::RgbaImage;

use crate::error::ScanError;
use crate::model::{Col, Point, Row, Skeleton};
use crate::options::GridOptions;
use crate::schema::Column;

/// Dividers stamped on the header line; the layout has one column more.
const RAW_COLUMNS: usize = Column::COUNT - 1;

/// Finds the table grid drawn into a rendered time-table.
///
/// The returned skeleton is in source-image coordinates and still holds the
/// raw divider-derived columns; the logical schema is applied after the
/// image has been cleaned (see [`crate::schema::reconcile_columns`]).
#[derive(Debug, Clone, Default)]
pub struct GridDetector {
    options: GridOptions,
}

impl GridDetector {
    #[must_use]
    pub fn new(options: GridOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn detect(&self, image: &RgbaImage) -> Result<Skeleton, ScanError> {
        self.options.validate()?;

        let row0 = self.find_row_origin(image)?;
        let col0 = self.find_col_origin(image, row0)?;
        tracing::debug!(row0, col0, "table origin located");

        let rows = self.find_rows(image, row0);
        if rows.is_empty() {
            return Err(ScanError::GridNotFound(format!(
                "no row lines below y={row0}"
            )));
        }

        let cols = self.find_cols(image, row0, col0);
        if cols.len() < RAW_COLUMNS {
            return Err(ScanError::GridNotFound(format!(
                "found {} of {RAW_COLUMNS} column dividers on y={row0}",
                cols.len()
            )));
        }
        tracing::debug!(rows = rows.len(), cols = cols.len(), "grid detected");

        Ok(Skeleton {
            width: image.width(),
            height: image.height(),
            rows,
            cols,
            origin: Point::default(),
        })
    }

    fn is_background(&self, image: &RgbaImage, x: u32, y: u32) -> bool {
        image
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| self.options.background.matches(*pixel, self.options.tolerance))
    }

    fn is_foreground(&self, image: &RgbaImage, x: u32, y: u32) -> bool {
        image
            .get_pixel_checked(x, y)
            .is_some_and(|pixel| self.options.foreground.matches(*pixel, self.options.tolerance))
    }

    fn find_row_origin(&self, image: &RgbaImage) -> Result<u32, ScanError> {
        (0..image.height())
            .find(|&y| !self.is_background(image, 0, y))
            .ok_or(ScanError::RowOriginNotFound)
    }

    fn find_col_origin(&self, image: &RgbaImage, row0: u32) -> Result<u32, ScanError> {
        (self.options.col_scan_start..image.width())
            .find(|&x| self.is_foreground(image, x, row0))
            .ok_or(ScanError::ColOriginNotFound { row: row0 })
    }

    fn find_rows(&self, image: &RgbaImage, row0: u32) -> Vec<Row> {
        let probe_x = image.width().saturating_sub(self.options.row_probe_inset);
        let mut rows = Vec::new();
        let mut top = row0;

        for y in row0 + 1..image.height() {
            if !self.is_foreground(image, probe_x, y) {
                if y - top > self.options.max_row_height {
                    break;
                }
                continue;
            }

            rows.push(Row {
                num: rows.len(),
                top,
                bottom: y,
            });
            top = y;
        }

        rows
    }

    fn find_cols(&self, image: &RgbaImage, row0: u32, col0: u32) -> Vec<Col> {
        let mut cols = Vec::new();
        let mut left = col0;

        for x in col0 + 1..image.width() {
            if !self.is_marker(image, x, row0) {
                continue;
            }

            cols.push(Col {
                num: cols.len(),
                left,
                right: x,
            });
            if cols.len() == RAW_COLUMNS {
                break;
            }
            left = x;
        }

        cols
    }

    /// A divider stamp is a plus of foreground pixels centred on `(x, y)`.
    fn is_marker(&self, image: &RgbaImage, x: u32, y: u32) -> bool {
        (0..self.options.marker_arm).all(|arm| {
            let right = x.checked_add(arm);
            let left = x.checked_sub(arm);
            let down = y.checked_add(arm);
            let up = y.checked_sub(arm);

            right.is_some_and(|px| self.is_foreground(image, px, y))
                && left.is_some_and(|px| self.is_foreground(image, px, y))
                && down.is_some_and(|py| self.is_foreground(image, x, py))
                && up.is_some_and(|py| self.is_foreground(image, x, py))
        })
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::GridDetector;
    use crate::error::ScanError;
    use crate::model::{Col, Row};
    use crate::options::GridOptions;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    fn hline(image: &mut RgbaImage, y: u32, color: Rgba<u8>) {
        for x in 0..image.width() {
            image.put_pixel(x, y, color);
        }
    }

    fn vline(image: &mut RgbaImage, x: u32, from: u32, to: u32, color: Rgba<u8>) {
        for y in from..=to {
            image.put_pixel(x, y, color);
        }
    }

    fn table() -> RgbaImage {
        let mut image = blank(120, 60);
        for y in [10, 30, 50] {
            hline(&mut image, y, BLACK);
        }
        for x in [40, 70, 100] {
            vline(&mut image, x, 6, 50, BLACK);
        }
        image
    }

    #[test]
    fn detects_rows_and_raw_columns() {
        let skeleton = GridDetector::default()
            .detect(&table())
            .expect("grid should be detected");

        assert_eq!(
            skeleton.rows,
            vec![
                Row {
                    num: 0,
                    top: 10,
                    bottom: 30
                },
                Row {
                    num: 1,
                    top: 30,
                    bottom: 50
                },
            ]
        );
        assert_eq!(
            skeleton.cols,
            vec![
                Col {
                    num: 0,
                    left: 3,
                    right: 40
                },
                Col {
                    num: 1,
                    left: 40,
                    right: 70
                },
                Col {
                    num: 2,
                    left: 70,
                    right: 100
                },
            ]
        );
        assert_eq!((skeleton.width, skeleton.height), (120, 60));
    }

    #[test]
    fn blank_image_has_no_row_origin() {
        let err = GridDetector::default()
            .detect(&blank(40, 40))
            .expect_err("blank image should fail");
        assert!(matches!(err, ScanError::RowOriginNotFound));
    }

    #[test]
    fn margin_mark_without_line_has_no_col_origin() {
        let mut image = blank(40, 40);
        for x in 0..3 {
            image.put_pixel(x, 12, BLACK);
        }
        let err = GridDetector::default()
            .detect(&image)
            .expect_err("short mark should fail");
        assert!(matches!(err, ScanError::ColOriginNotFound { row: 12 }));
    }

    #[test]
    fn lines_without_dividers_are_not_a_grid() {
        let mut image = blank(120, 60);
        for y in [10, 30] {
            hline(&mut image, y, BLACK);
        }
        let err = GridDetector::default()
            .detect(&image)
            .expect_err("missing dividers should fail");
        assert!(matches!(err, ScanError::GridNotFound(_)));
    }

    #[test]
    fn stops_collecting_rows_after_tall_gap() {
        let image = table();
        let mut tall = blank(120, 140);
        for (x, y, pixel) in image.enumerate_pixels() {
            tall.put_pixel(x, y, *pixel);
        }
        hline(&mut tall, 120, BLACK);

        let skeleton = GridDetector::default()
            .detect(&tall)
            .expect("grid should be detected");
        assert_eq!(skeleton.rows.len(), 2);
        assert_eq!(skeleton.rows[1].bottom, 50);
    }

    #[test]
    fn stops_after_third_divider() {
        let mut image = table();
        vline(&mut image, 110, 6, 50, BLACK);
        let skeleton = GridDetector::default()
            .detect(&image)
            .expect("grid should be detected");
        assert_eq!(skeleton.cols.len(), 3);
        assert_eq!(skeleton.cols[2].right, 100);
    }

    #[test]
    fn grey_strokes_are_not_dividers() {
        let mut image = table();
        vline(&mut image, 20, 6, 50, Rgba([128, 128, 128, 255]));
        let skeleton = GridDetector::default()
            .detect(&image)
            .expect("grid should be detected");
        assert_eq!(skeleton.cols[0].right, 40);
    }

    #[test]
    fn near_black_lines_match_within_tolerance() {
        let mut image = blank(120, 60);
        let ink = Rgba([12, 12, 20, 255]);
        for y in [10, 30, 50] {
            hline(&mut image, y, ink);
        }
        for x in [40, 70, 100] {
            vline(&mut image, x, 6, 50, ink);
        }

        assert!(GridDetector::default().detect(&image).is_ok());

        let strict = GridDetector::new(GridOptions {
            tolerance: 0,
            ..GridOptions::default()
        });
        assert!(strict.detect(&image).is_err());
    }
}
