//! Export pipeline configuration.
//!
//! Every fixed constant of the export (delays, retry policy, page
//! geometry, header layout, file naming) lives in [`ExportConfig`] so a
//! host can tune it, and so the CLI can load it from JSON.
//!
//! Durations are serialized as integer milliseconds rather than serde's
//! `{ secs, nanos }` form.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::types::ColorMode;

/// Serde support for `std::time::Duration` as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as whole milliseconds.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    /// Deserialize a `Duration` from whole milliseconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Errors raised by [`ExportConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A field holds a value the pipeline cannot work with.
    #[error("invalid export configuration: {0}")]
    Invalid(String),
}

/// Page size and image placement, in document units (millimetres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Distance from the top edge to the top of the placed image.
    /// Everything above it is reserved for the header.
    pub image_top: f64,
    /// Blank space kept below the image on every page.
    pub bottom_margin: f64,
}

impl PageGeometry {
    /// Portrait A4.
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
        image_top: 40.0,
        bottom_margin: 10.0,
    };

    /// Height left for the image on one page of the given height.
    #[must_use]
    pub fn available_height(&self, page_height: f64) -> f64 {
        page_height - self.image_top - self.bottom_margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Text and positions of the first-page header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLayout {
    /// Report title.
    pub title: String,
    /// Font size of the title, in points.
    pub title_font_size: f64,
    /// Font size of the "Generated" and "Period" lines, in points.
    pub meta_font_size: f64,
    /// Baseline of the title, from the top edge.
    pub title_y: f64,
    /// Baseline of the "Generated" line.
    pub generated_y: f64,
    /// Baseline of the "Period" line.
    pub period_y: f64,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            title: String::from("Financial Dashboard Report"),
            title_font_size: 18.0,
            meta_font_size: 10.0,
            title_y: 20.0,
            generated_y: 28.0,
            period_y: 34.0,
        }
    }
}

/// Configuration for one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pause before sampling, letting animations and async layout finish.
    #[serde(with = "duration_ms")]
    pub settle_delay: Duration,

    /// Total number of load + capture attempts.
    pub capture_attempts: u32,

    /// Pause between failed capture attempts.
    #[serde(with = "duration_ms")]
    pub retry_backoff: Duration,

    /// Pixel-density multiplier passed to the screenshot capability.
    pub pixel_scale: f64,

    /// Whether cross-origin images are included in the capture.
    pub allow_cross_origin: bool,

    /// Capture background fill in light mode.
    pub light_background: Rgb,

    /// Capture background fill in dark mode.
    pub dark_background: Rgb,

    /// Page size and image placement.
    pub page: PageGeometry,

    /// First-page header.
    pub header: HeaderLayout,

    /// Leading part of every generated file name.
    pub filename_prefix: String,
}

impl ExportConfig {
    /// Default settle delay before capture.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
    /// Default number of capture attempts.
    pub const DEFAULT_CAPTURE_ATTEMPTS: u32 = 3;
    /// Default pause between capture attempts.
    pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);
    /// Default pixel-density multiplier.
    pub const DEFAULT_PIXEL_SCALE: f64 = 2.0;
    /// Default light-mode background (`#ffffff`).
    pub const DEFAULT_LIGHT_BACKGROUND: Rgb = Rgb::WHITE;
    /// Default dark-mode background (`#111827`).
    pub const DEFAULT_DARK_BACKGROUND: Rgb = Rgb::from_u32(0x0011_1827);
    /// Default file name prefix.
    pub const DEFAULT_FILENAME_PREFIX: &'static str = "financial-dashboard";

    /// Capture background fill for the given mode.
    #[must_use]
    pub const fn background(&self, mode: ColorMode) -> Rgb {
        match mode {
            ColorMode::Light => self.light_background,
            ColorMode::Dark => self.dark_background,
        }
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if there are no capture attempts,
    /// the pixel scale is not positive, the page has no width, or the
    /// page geometry leaves no room for the image.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture_attempts == 0 {
            return Err(ConfigError::Invalid(
                "capture_attempts must be at least 1".into(),
            ));
        }
        if !(self.pixel_scale.is_finite() && self.pixel_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pixel_scale must be positive, got {}",
                self.pixel_scale
            )));
        }
        if !(self.page.width.is_finite() && self.page.width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "page width must be positive, got {}",
                self.page.width
            )));
        }
        let available = self.page.available_height(self.page.height);
        if !(available.is_finite() && available > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "page geometry leaves no room for the image ({available} available)"
            )));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            capture_attempts: Self::DEFAULT_CAPTURE_ATTEMPTS,
            retry_backoff: Self::DEFAULT_RETRY_BACKOFF,
            pixel_scale: Self::DEFAULT_PIXEL_SCALE,
            allow_cross_origin: true,
            light_background: Self::DEFAULT_LIGHT_BACKGROUND,
            dark_background: Self::DEFAULT_DARK_BACKGROUND,
            page: PageGeometry::default(),
            header: HeaderLayout::default(),
            filename_prefix: Self::DEFAULT_FILENAME_PREFIX.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ExportConfig::default().validate(), Ok(()));
    }

    #[test]
    fn a4_leaves_247mm_for_the_image() {
        let page = PageGeometry::A4;
        assert!((page.available_height(page.height) - 247.0).abs() < 1e-9);
    }

    #[test]
    fn background_follows_mode() {
        let config = ExportConfig::default();
        assert_eq!(config.background(ColorMode::Light).to_string(), "#ffffff");
        assert_eq!(config.background(ColorMode::Dark).to_string(), "#111827");
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = ExportConfig {
            capture_attempts: 0,
            ..ExportConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn non_positive_scale_rejected() {
        for scale in [0.0, -1.0, f64::NAN] {
            let config = ExportConfig {
                pixel_scale: scale,
                ..ExportConfig::default()
            };
            assert!(config.validate().is_err(), "scale {scale} accepted");
        }
    }

    #[test]
    fn header_taller_than_page_rejected() {
        let config = ExportConfig {
            page: PageGeometry {
                image_top: 290.0,
                ..PageGeometry::A4
            },
            ..ExportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip_uses_milliseconds() {
        let config = ExportConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["settle_delay"], 500);
        assert_eq!(json["retry_backoff"], 250);
        assert_eq!(json["dark_background"], "#111827");

        let back: ExportConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r#"{"capture_attempts": 5, "page": {"height": 279.4}}"#).unwrap();
        assert_eq!(config.capture_attempts, 5);
        assert!((config.page.height - 279.4).abs() < 1e-9);
        assert!((config.page.width - 210.0).abs() < 1e-9);
        assert_eq!(config.settle_delay, ExportConfig::DEFAULT_SETTLE_DELAY);
    }
}
