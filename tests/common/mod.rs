#![allow(dead_code)]

use std::path::Path;

use image::{Rgba, RgbaImage};
use unmht::{BoundingBox, DetectionKind, TextDetection};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Geometry of a painted time-table.
///
/// Horizontal `lines` run across the full width. Each divider is a vertical
/// line from four pixels above the first line down to the last one, which
/// stamps the plus-shaped marker on the header line.
pub struct TableLayout {
    pub width: u32,
    pub height: u32,
    pub lines: Vec<u32>,
    pub dividers: [u32; 3],
}

/// Two rows, cropped frame 210x60: rows [0,30] [30,60], logical columns
/// Date [0,40], Activity [80,150], In [150,180], Out [180,210].
pub fn two_row_layout() -> TableLayout {
    TableLayout {
        width: 220,
        height: 100,
        lines: vec![10, 40, 70],
        dividers: [83, 153, 213],
    }
}

pub const FRAME_WIDTH: f64 = 210.0;
pub const FRAME_HEIGHT: f64 = 60.0;

pub fn paint_table(layout: &TableLayout) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(layout.width, layout.height, WHITE);
    for &y in &layout.lines {
        for x in 0..layout.width {
            image.put_pixel(x, y, BLACK);
        }
    }

    let top = layout.lines.first().copied().unwrap_or(4).saturating_sub(4);
    let bottom = layout.lines.last().copied().unwrap_or(top);
    for &x in &layout.dividers {
        for y in top..=bottom {
            image.put_pixel(x, y, BLACK);
        }
    }
    image
}

pub fn blank_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, WHITE)
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    image.save(path)?;
    Ok(())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// A word whose centre sits at `(x, y)` in cropped-frame pixels.
pub fn word_at(text: &str, x: f64, y: f64) -> TextDetection {
    TextDetection {
        text: text.to_string(),
        kind: DetectionKind::Word,
        bounding_box: BoundingBox {
            left: (x - 6.0) / FRAME_WIDTH,
            top: (y - 4.0) / FRAME_HEIGHT,
            width: 12.0 / FRAME_WIDTH,
            height: 8.0 / FRAME_HEIGHT,
        },
    }
}

pub const ROW_0: f64 = 15.0;
pub const ROW_1: f64 = 45.0;
pub const DATE_X: f64 = 20.0;
pub const ACTIVITY_X: f64 = 95.0;
pub const IN_X: f64 = 165.0;
pub const OUT_X: f64 = 195.0;
