use std::str::FromStr;

use chrono::{NaiveTime, TimeDelta, Timelike};
use image::Rgba;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpec {
    pub rgba: [u8; 4],
}

impl ColorSpec {
    pub const WHITE: Self = Self {
        rgba: [255, 255, 255, 255],
    };
    pub const BLACK: Self = Self {
        rgba: [0, 0, 0, 255],
    };

    /// Largest per-channel distance, alpha included.
    #[must_use]
    pub fn distance(&self, pixel: Rgba<u8>) -> u8 {
        self.rgba
            .iter()
            .zip(pixel.0.iter())
            .map(|(expected, actual)| expected.abs_diff(*actual))
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn matches(&self, pixel: Rgba<u8>, tolerance: u8) -> bool {
        self.distance(pixel) <= tolerance
    }

    #[must_use]
    pub fn to_pixel(self) -> Rgba<u8> {
        Rgba(self.rgba)
    }
}

impl FromStr for ColorSpec {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let trimmed = spec.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| format!("invalid color '{spec}', expected #rrggbb or #rrggbbaa"))?;
        if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!(
                "invalid color '{spec}', expected #rrggbb or #rrggbbaa"
            ));
        }

        let mut rgba = [255_u8; 4];
        for (index, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
            let pair = &hex[index * 2..index * 2 + 2];
            *channel = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("invalid color channel '{pair}' in '{spec}'"))?;
        }

        Ok(Self { rgba })
    }
}

/// Parses `HH:MM` into the offset since midnight.
pub fn parse_clock(spec: &str) -> Result<TimeDelta, String> {
    let time = NaiveTime::parse_from_str(spec.trim(), "%H:%M")
        .map_err(|_| format!("invalid time of day '{spec}', expected HH:MM"))?;
    Ok(TimeDelta::seconds(i64::from(time.num_seconds_from_midnight())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub background: ColorSpec,
    pub foreground: ColorSpec,
    pub tolerance: u8,
    /// Pixels each arm of the divider marker must extend, centre included.
    pub marker_arm: u32,
    pub max_row_height: u32,
    /// Distance from the right edge of the column sampled for row lines.
    pub row_probe_inset: u32,
    pub col_scan_start: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            background: ColorSpec::WHITE,
            foreground: ColorSpec::BLACK,
            tolerance: 32,
            marker_arm: 5,
            max_row_height: 50,
            row_probe_inset: 5,
            col_scan_start: 3,
        }
    }
}

impl GridOptions {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.marker_arm == 0 {
            return Err(ScanError::InvalidOption(
                "marker_arm must be at least 1".to_string(),
            ));
        }
        if self.max_row_height == 0 {
            return Err(ScanError::InvalidOption(
                "max_row_height must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsOptions {
    pub default_in: TimeDelta,
    pub default_out: TimeDelta,
    pub rounding: TimeDelta,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            default_in: TimeDelta::hours(9),
            default_out: TimeDelta::hours(17),
            rounding: TimeDelta::minutes(15),
        }
    }
}

impl AnalyticsOptions {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.rounding <= TimeDelta::zero() {
            return Err(ScanError::InvalidOption(
                "rounding must be a positive duration".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub grid: GridOptions,
    pub analytics: AnalyticsOptions,
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), ScanError> {
        self.grid.validate()?;
        self.analytics.validate()
    }
}
