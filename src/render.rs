use std::io::Cursor;

use image::{GrayImage, ImageFormat, RgbaImage, imageops};

use crate::error::ScanError;
use crate::model::Skeleton;
use crate::options::ColorSpec;

/// Cleaned, cropped table ready for OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Paints over every row top and column right edge across the whole image.
pub fn erase_grid_lines(image: &mut RgbaImage, skeleton: &Skeleton, background: ColorSpec) {
    let (width, height) = image.dimensions();
    let pixel = background.to_pixel();

    for row in &skeleton.rows {
        let y = row.top + skeleton.origin.y;
        if y >= height {
            continue;
        }
        for x in 0..width {
            image.put_pixel(x, y, pixel);
        }
    }

    for col in &skeleton.cols {
        let x = col.right + skeleton.origin.x;
        if x >= width {
            continue;
        }
        for y in 0..height {
            image.put_pixel(x, y, pixel);
        }
    }
}

/// Crops to the span of the first/last row and column and drops colour.
pub fn crop_to_table(image: &RgbaImage, skeleton: &Skeleton) -> Result<GrayImage, ScanError> {
    let (Some(first_row), Some(last_row)) = (skeleton.rows.first(), skeleton.rows.last()) else {
        return Err(ScanError::GridNotFound("no rows to crop".to_string()));
    };
    let (Some(first_col), Some(last_col)) = (skeleton.cols.first(), skeleton.cols.last()) else {
        return Err(ScanError::GridNotFound("no columns to crop".to_string()));
    };

    let x = first_col.left + skeleton.origin.x;
    let y = first_row.top + skeleton.origin.y;
    let width = last_col.right.saturating_sub(first_col.left);
    let height = last_row.bottom.saturating_sub(first_row.top);
    if width == 0 || height == 0 || x + width > image.width() || y + height > image.height() {
        return Err(ScanError::GridNotFound(format!(
            "table rectangle {width}x{height}+{x}+{y} does not fit the {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let cropped = imageops::crop_imm(image, x, y, width, height).to_image();
    Ok(imageops::grayscale(&cropped))
}

pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, ScanError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Produces the exact bytes handed to the OCR collaborator.
///
/// `skeleton` must be the raw detection result: the erased lines are the
/// detected boundaries, not the reconciled logical columns.
pub fn render(
    image: &RgbaImage,
    skeleton: &Skeleton,
    background: ColorSpec,
) -> Result<Rendered, ScanError> {
    let mut cleaned = image.clone();
    erase_grid_lines(&mut cleaned, skeleton, background);
    let table = crop_to_table(&cleaned, skeleton)?;
    let png = encode_png(&table)?;
    tracing::debug!(
        width = table.width(),
        height = table.height(),
        bytes = png.len(),
        "rendered cleaned table"
    );

    Ok(Rendered {
        png,
        width: table.width(),
        height: table.height(),
    })
}
