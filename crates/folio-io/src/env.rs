//! The browser [`Environment`]: DOM readiness, timers, the style layer,
//! native dialogs, and PDF downloads.

use std::time::Duration;

use folio_pdf::{PdfMetadata, PdfWriter};
use folio_pipeline::config::PageGeometry;
use folio_pipeline::{CapabilityError, Environment};
use gloo_timers::future::TimeoutFuture;
use web_sys::HtmlElement;

use crate::dialog;
use crate::download::BrowserSink;
use crate::screenshot::Html2CanvasProvider;
use crate::style_layer::StyleLayer;

/// Runs exports against the live page.
#[derive(Debug, Clone, Default)]
pub struct BrowserEnvironment {
    provider: Html2CanvasProvider,
    metadata: PdfMetadata,
}

impl BrowserEnvironment {
    /// Environment using the global `html2canvas` and default metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: PdfMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Environment for BrowserEnvironment {
    type Region = HtmlElement;
    type Provider = Html2CanvasProvider;
    type Writer = PdfWriter<BrowserSink>;
    type StyleLayer = StyleLayer;

    fn is_ready(&self, region: &HtmlElement) -> bool {
        region.is_connected() && region.offset_width() > 0 && region.offset_height() > 0
    }

    async fn sleep(&mut self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }

    fn screenshot_provider(&mut self) -> &mut Html2CanvasProvider {
        &mut self.provider
    }

    fn new_document(
        &mut self,
        page: &PageGeometry,
    ) -> Result<PdfWriter<BrowserSink>, CapabilityError> {
        Ok(PdfWriter::new(page, &self.metadata, BrowserSink)?)
    }

    fn inject_style(&mut self, css: &str) -> Result<StyleLayer, CapabilityError> {
        StyleLayer::inject(css).map_err(|e| CapabilityError::other(e.to_string()))
    }

    fn remove_style(&mut self, layer: StyleLayer) {
        layer.remove();
    }

    fn confirm(&mut self, message: &str) -> bool {
        dialog::confirm(message)
    }

    fn print(&mut self) {
        dialog::print();
    }
}
