//! Shared types for the folio export pipeline.

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hand raster captures
/// to the pipeline without depending on `image` directly.
pub use image::RgbaImage;

/// Light or dark rendering of the dashboard at export time.
///
/// Selects the capture background fill and the hex fallbacks applied
/// to elements whose colors the screenshot capability cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light theme (white page background).
    #[default]
    Light,
    /// Dark theme (near-black page background).
    Dark,
}

impl ColorMode {
    /// Returns `true` for [`ColorMode::Dark`].
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Pixel dimensions of a raster capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A single request to export the on-screen region.
///
/// Created when the user invokes export and consumed by exactly one
/// call to [`export`](crate::export).  `R` is the host's handle for the
/// region to capture (a DOM element in the browser, a file in the CLI).
#[derive(Debug, Clone)]
pub struct ExportRequest<R> {
    /// The region to capture.  `None` when the target is not mounted.
    pub region: Option<R>,
    /// Theme the region is currently rendered in.
    pub color_mode: ColorMode,
    /// Label of the reporting period shown on the dashboard
    /// (e.g. `"Last 30 Days"`).
    pub period_label: String,
    /// When the export was requested, in the user's UTC offset.
    ///
    /// The header shows this local time; file names use its UTC form.
    pub timestamp: DateTime<FixedOffset>,
}

impl<R> ExportRequest<R> {
    /// Create a request stamped with the current local time.
    pub fn new(region: Option<R>, color_mode: ColorMode, period_label: impl Into<String>) -> Self {
        Self {
            region,
            color_mode,
            period_label: period_label.into(),
            timestamp: Local::now().fixed_offset(),
        }
    }

    /// Replace the request timestamp, keeping its offset.
    #[must_use]
    pub fn at<Tz: TimeZone>(mut self, timestamp: DateTime<Tz>) -> Self {
        self.timestamp = timestamp.fixed_offset();
        self
    }
}

/// The raster produced by the screenshot capability.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Captured pixels.
    pub image: RgbaImage,
}

impl CaptureResult {
    /// Wrap a captured image.
    #[must_use]
    pub const fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Pixel dimensions of the capture.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Returns `true` if the capture has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// Why an export did not produce a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Another export was already in flight.
    Busy,
    /// The target region was absent or empty.
    TargetNotReady,
    /// The screenshot capability (or the libraries behind it) could not
    /// be used after all attempts.
    CaptureUnavailable,
    /// Capture failed on a color function the capability cannot parse.
    ColorIncompatibility,
    /// Any other failure, with its message.
    Generic(String),
}

/// What happened with the print fallback after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// No fallback was offered.
    NotOffered,
    /// The native print dialog was opened without asking.
    Printed,
    /// The user was asked whether to print instead.
    Offered {
        /// Whether the user accepted (and print was invoked).
        accepted: bool,
    },
}

/// Result of one export invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The document was handed to the writer's save operation.
    Saved {
        /// Generated file name.
        filename: String,
        /// Number of pages in the document.
        pages: usize,
    },
    /// The export failed.
    Failed {
        /// Classified failure reason.
        reason: FailureReason,
        /// Print fallback handling.
        fallback: Fallback,
    },
}

impl ExportOutcome {
    /// Returns `true` if a document was saved.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// File name of the saved document, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Saved { filename, .. } => Some(filename),
            Self::Failed { .. } => None,
        }
    }

    /// Failure reason, if the export failed.
    #[must_use]
    pub const fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Saved { .. } => None,
            Self::Failed { reason, .. } => Some(reason),
        }
    }
}
