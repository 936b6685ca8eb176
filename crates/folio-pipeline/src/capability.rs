//! Collaborator contracts.
//!
//! The pipeline never touches a DOM, a rasterizer, a PDF library or a
//! file system itself.  Hosts implement these traits: `folio-io` for the
//! browser, `folio-cli` for the command line, and the tests with
//! deterministic fakes.
//!
//! Futures returned by these traits are not required to be `Send`; the
//! pipeline runs on a single-threaded event loop.

use std::time::Duration;

use image::RgbaImage;

use crate::color::Rgb;
use crate::config::PageGeometry;
use crate::failure::CapabilityError;
use crate::sanitize::SanitizeRules;
use crate::types::CaptureResult;

/// Horizontal anchoring of placed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the center.
    Center,
    /// `x` is the right edge.
    Right,
}

/// Options honored by [`Screenshot::capture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Pixel-density multiplier.
    pub scale: f64,
    /// Whether cross-origin images are included.
    pub allow_cross_origin: bool,
    /// Fill behind transparent pixels.
    pub background: Rgb,
    /// Exclusion predicate and clone pass.
    pub rules: SanitizeRules,
}

/// A loaded screenshot capability.
#[allow(async_fn_in_trait)]
pub trait Screenshot {
    /// Host handle for the region to capture.
    type Region;

    /// Rasterize `region`.
    ///
    /// Implementations must skip elements for which
    /// [`SanitizeRules::excludes`] holds, and apply
    /// [`SanitizeRules::clone_overrides`] to every element of the copy
    /// they render from.
    async fn capture(
        &mut self,
        region: &Self::Region,
        options: &CaptureOptions,
    ) -> Result<CaptureResult, CapabilityError>;
}

/// Loads the screenshot capability on demand.
///
/// Loading may fail (a script that did not arrive, a missing global),
/// in which case the pipeline retries it together with the capture.
#[allow(async_fn_in_trait)]
pub trait ScreenshotProvider {
    /// Host handle for the region to capture.
    type Region;
    /// The loaded capability.
    type Screenshot: Screenshot<Region = Self::Region>;

    /// Resolve the capability.
    async fn load(&mut self) -> Result<Self::Screenshot, CapabilityError>;
}

/// Builds a paginated document.
///
/// Coordinates are in document units (millimetres) measured from the
/// top-left corner of the current page.
pub trait DocumentWriter {
    /// Width of the current page.
    fn page_width(&self) -> f64;

    /// Height of the current page.
    fn page_height(&self) -> f64;

    /// Font size, in points, for subsequent [`text`](Self::text) calls.
    fn set_font_size(&mut self, size: f64);

    /// Place a line of text with its baseline at `y`.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if the writer cannot place the text.
    fn text(&mut self, text: &str, x: f64, y: f64, align: TextAlign)
    -> Result<(), CapabilityError>;

    /// Place an image with its top-left corner at (`x`, `y`), stretched
    /// to `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if the image cannot be encoded.
    fn image(
        &mut self,
        image: &RgbaImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), CapabilityError>;

    /// Start a new blank page; it becomes the current page.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if the page cannot be created.
    fn add_page(&mut self) -> Result<(), CapabilityError>;

    /// Serialize the document and deliver it under `filename`.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if serialization or delivery fails.
    fn save(&mut self, filename: &str) -> Result<(), CapabilityError>;
}

/// Everything the pipeline needs from its host.
#[allow(async_fn_in_trait)]
pub trait Environment {
    /// Host handle for the region to capture.
    type Region;
    /// Screenshot capability provider.
    type Provider: ScreenshotProvider<Region = Self::Region>;
    /// Document writer.
    type Writer: DocumentWriter;
    /// Handle of an injected style layer.
    type StyleLayer;

    /// Whether `region` is mounted and has a non-empty area.
    fn is_ready(&self, region: &Self::Region) -> bool;

    /// Suspend for `duration`.  A zero duration yields to the event loop.
    async fn sleep(&mut self, duration: Duration);

    /// The screenshot capability provider.
    fn screenshot_provider(&mut self) -> &mut Self::Provider;

    /// Start an empty document with the given page geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if the writer cannot be created.
    fn new_document(&mut self, page: &PageGeometry) -> Result<Self::Writer, CapabilityError>;

    /// Inject a temporary style layer holding `css`.
    ///
    /// # Errors
    ///
    /// Returns a [`CapabilityError`] if the layer cannot be attached.
    fn inject_style(&mut self, css: &str) -> Result<Self::StyleLayer, CapabilityError>;

    /// Remove a layer returned by [`inject_style`](Self::inject_style).
    fn remove_style(&mut self, layer: Self::StyleLayer);

    /// Ask the user a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Open the native print dialog.
    fn print(&mut self);
}
