//! Command-line [`Environment`]: a PNG on disk stands in for the
//! dashboard, and the report is written to an output directory.
//!
//! There is no page to restyle and no print dialog.  Style layers are
//! no-ops, and the print fallback is always declined.

use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_pdf::{DocumentSink, PdfMetadata, PdfWriter};
use folio_pipeline::config::PageGeometry;
use folio_pipeline::{
    CapabilityError, CaptureOptions, CaptureResult, Environment, Rgb, RgbaImage, Screenshot,
    ScreenshotProvider,
};

/// Composite every pixel of `image` onto an opaque `background`.
pub fn flatten_onto(image: &mut RgbaImage, background: Rgb) {
    let Rgb(fill) = background;
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let mut out = [0, 0, 0, 255];
        for ((slot, channel), fill) in out.iter_mut().zip([r, g, b]).zip(fill) {
            let blended =
                (u16::from(channel) * alpha + u16::from(fill) * (255 - alpha) + 127) / 255;
            *slot = u8::try_from(blended).unwrap_or(u8::MAX);
        }
        pixel.0 = out;
    }
}

/// Decodes a capture image from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCapture;

impl Screenshot for FileCapture {
    type Region = PathBuf;

    async fn capture(
        &mut self,
        region: &PathBuf,
        options: &CaptureOptions,
    ) -> Result<CaptureResult, CapabilityError> {
        let mut image = image::open(region)
            .map_err(|e| CapabilityError::other(format!("{}: {e}", region.display())))?
            .to_rgba8();
        flatten_onto(&mut image, options.background);
        Ok(CaptureResult::new(image))
    }
}

/// Always-available [`FileCapture`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCaptureProvider;

impl ScreenshotProvider for FileCaptureProvider {
    type Region = PathBuf;
    type Screenshot = FileCapture;

    async fn load(&mut self) -> Result<FileCapture, CapabilityError> {
        Ok(FileCapture)
    }
}

/// Writes delivered documents into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
}

impl FileSink {
    /// Sink writing into `out_dir`, which must already exist.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Path a document named `filename` is written to.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.out_dir.join(filename)
    }
}

impl DocumentSink for FileSink {
    type Error = std::io::Error;

    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> Result<(), std::io::Error> {
        let path = self.path_for(filename);
        std::fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "report written");
        Ok(())
    }
}

/// The command-line host.
#[derive(Debug, Clone)]
pub struct FileEnvironment {
    provider: FileCaptureProvider,
    sink: FileSink,
    metadata: PdfMetadata,
}

impl FileEnvironment {
    /// Host writing reports into `out_dir`.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider: FileCaptureProvider,
            sink: FileSink::new(out_dir),
            metadata: PdfMetadata::default(),
        }
    }

    /// The sink reports are delivered to.
    #[must_use]
    pub const fn sink(&self) -> &FileSink {
        &self.sink
    }
}

impl Environment for FileEnvironment {
    type Region = PathBuf;
    type Provider = FileCaptureProvider;
    type Writer = PdfWriter<FileSink>;
    type StyleLayer = ();

    fn is_ready(&self, region: &PathBuf) -> bool {
        is_non_empty_file(region)
    }

    async fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    fn screenshot_provider(&mut self) -> &mut FileCaptureProvider {
        &mut self.provider
    }

    fn new_document(
        &mut self,
        page: &PageGeometry,
    ) -> Result<PdfWriter<FileSink>, CapabilityError> {
        Ok(PdfWriter::new(page, &self.metadata, self.sink.clone())?)
    }

    fn inject_style(&mut self, _css: &str) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn remove_style(&mut self, _layer: ()) {}

    fn confirm(&mut self, message: &str) -> bool {
        tracing::info!("declining print fallback: {message}");
        false
    }

    fn print(&mut self) {
        tracing::warn!("print fallback is not available on the command line");
    }
}

fn is_non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn transparent_pixels_take_the_background() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        flatten_onto(&mut image, Rgb([17, 24, 39]));
        assert_eq!(image.get_pixel(0, 0).0, [17, 24, 39, 255]);
    }

    #[test]
    fn opaque_pixels_are_kept() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255]));
        flatten_onto(&mut image, Rgb::WHITE);
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn missing_file_is_not_ready() {
        let env = FileEnvironment::new(".");
        assert!(!env.is_ready(&PathBuf::from("does/not/exist.png")));
    }

    #[test]
    fn sink_writes_into_out_dir() {
        let dir = scratch_dir("sink");
        let mut sink = FileSink::new(&dir);
        sink.deliver("report.pdf", b"%PDF-1.3").unwrap();
        assert_eq!(std::fs::read(dir.join("report.pdf")).unwrap(), b"%PDF-1.3");
        std::fs::remove_dir_all(dir).unwrap();
    }
}
