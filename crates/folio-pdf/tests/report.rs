//! Integration test: run a synthetic dashboard capture through the full
//! export pipeline and check the PDF that comes out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use folio_pdf::{MemorySink, PdfMetadata, PdfWriter};
use folio_pipeline::{
    CapabilityError, CaptureOptions, CaptureResult, ColorMode, Environment, ExportConfig,
    ExportGuard, ExportOutcome, ExportRequest, PageGeometry, RgbaImage, Screenshot,
    ScreenshotProvider,
};
use printpdf::lopdf;

/// A "dashboard" of stacked colored cards.
fn dashboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        let card = (y / 150) % 3;
        match card {
            0 => image::Rgba([37, 99, 235, 255]),
            1 => image::Rgba([22, 163, 74, 255]),
            _ => image::Rgba([255, 255, 255, 255]),
        }
    })
}

struct StaticScreenshot(RgbaImage);

impl Screenshot for StaticScreenshot {
    type Region = ();

    async fn capture(
        &mut self,
        _region: &(),
        options: &CaptureOptions,
    ) -> Result<CaptureResult, CapabilityError> {
        assert!((options.scale - 2.0).abs() < f64::EPSILON);
        Ok(CaptureResult::new(self.0.clone()))
    }
}

struct StaticProvider(RgbaImage);

impl ScreenshotProvider for StaticProvider {
    type Region = ();
    type Screenshot = StaticScreenshot;

    async fn load(&mut self) -> Result<StaticScreenshot, CapabilityError> {
        Ok(StaticScreenshot(self.0.clone()))
    }
}

struct MemoryEnv {
    provider: StaticProvider,
    sink: MemorySink,
}

impl Environment for MemoryEnv {
    type Region = ();
    type Provider = StaticProvider;
    type Writer = PdfWriter<MemorySink>;
    type StyleLayer = ();

    fn is_ready(&self, _region: &()) -> bool {
        true
    }

    async fn sleep(&mut self, _duration: Duration) {}

    fn screenshot_provider(&mut self) -> &mut StaticProvider {
        &mut self.provider
    }

    fn new_document(
        &mut self,
        page: &PageGeometry,
    ) -> Result<PdfWriter<MemorySink>, CapabilityError> {
        Ok(PdfWriter::new(page, &PdfMetadata::default(), self.sink.clone())?)
    }

    fn inject_style(&mut self, _css: &str) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn remove_style(&mut self, _layer: ()) {}

    fn confirm(&mut self, _message: &str) -> bool {
        false
    }

    fn print(&mut self) {}
}

fn export(capture: RgbaImage) -> (ExportOutcome, MemorySink) {
    let sink = MemorySink::new();
    let mut env = MemoryEnv {
        provider: StaticProvider(capture),
        sink: sink.clone(),
    };
    let request = ExportRequest::new(Some(()), ColorMode::Light, "Last 30 Days")
        .at(Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 9).unwrap());
    let outcome = futures::executor::block_on(folio_pipeline::export(
        &mut env,
        &ExportGuard::new(),
        request,
        &ExportConfig::default(),
    ));
    (outcome, sink)
}

#[test]
fn tall_dashboard_becomes_multi_page_pdf() {
    // 420 px wide -> 2 px/mm; 1200 rows -> 600 mm -> 3 pages of 247 mm.
    let (outcome, sink) = export(dashboard(420, 1200));
    let expected = "financial-dashboard-last-30-days-2026-10-18_14-05-09.pdf";
    assert_eq!(
        outcome,
        ExportOutcome::Saved {
            filename: expected.to_owned(),
            pages: 3,
        }
    );

    let saved = sink.take();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].filename, expected);

    let document = lopdf::Document::load_mem(&saved[0].bytes).expect("valid PDF");
    assert_eq!(document.get_pages().len(), 3);
}

#[test]
fn short_dashboard_fits_one_page() {
    let (outcome, sink) = export(dashboard(1260, 600));
    assert!(outcome.is_success());
    let saved = sink.take();
    let document = lopdf::Document::load_mem(&saved[0].bytes).expect("valid PDF");
    assert_eq!(document.get_pages().len(), 1);
}
