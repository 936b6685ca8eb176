//! [`DocumentWriter`] backed by `printpdf`.
//!
//! Coordinates arrive in millimetres from the top-left corner of the
//! page and are flipped to PDF's bottom-left origin here.  Text is set in
//! the builtin Helvetica, so nothing is embedded.  Images are written as
//! raw RGB XObjects with any alpha composited onto white.

use folio_pipeline::config::PageGeometry;
use folio_pipeline::{CapabilityError, DocumentWriter, RgbaImage, TextAlign};
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef, Mm,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Px,
};

use crate::metrics::text_width;
use crate::sink::DocumentSink;

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Resolution images are nominally placed at before scaling to their
/// target box.
const IMAGE_DPI: f64 = 300.0;

/// Name of the single layer on every page.
const LAYER_NAME: &str = "Report";

/// Errors raised while building or delivering a PDF.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PdfError {
    /// `printpdf` rejected the font or document.
    #[error("PDF construction failed: {0}")]
    Build(String),

    /// The image has no pixels.
    #[error("cannot place an empty image ({width}x{height})")]
    EmptyImage {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// The document was already saved; a writer saves once.
    #[error("document was already saved")]
    AlreadySaved,

    /// The sink refused the document.
    #[error("could not deliver {filename}: {message}")]
    Deliver {
        /// File name the document was meant for.
        filename: String,
        /// The sink's error.
        message: String,
    },
}

impl From<PdfError> for CapabilityError {
    fn from(error: PdfError) -> Self {
        Self::other(error.to_string())
    }
}

/// Document information written to the PDF metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    /// Document title.
    pub title: String,
    /// Producing application.
    pub creator: String,
}

impl Default for PdfMetadata {
    fn default() -> Self {
        Self {
            title: String::from("Financial Dashboard Report"),
            creator: String::from("folio"),
        }
    }
}

/// Builds a PDF page by page and delivers it to a [`DocumentSink`].
pub struct PdfWriter<S> {
    document: Option<PdfDocumentReference>,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_size: f64,
    page_width: f64,
    page_height: f64,
    pages: usize,
    sink: S,
}

impl<S: DocumentSink> PdfWriter<S> {
    /// Start a one-page document sized by `page`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Build`] if the builtin font cannot be added.
    pub fn new(page: &PageGeometry, metadata: &PdfMetadata, sink: S) -> Result<Self, PdfError> {
        let (document, page_index, layer_index) =
            PdfDocument::new(&metadata.title, mm(page.width), mm(page.height), LAYER_NAME);
        let document = document
            .with_creator(&metadata.creator)
            .with_producer(&metadata.creator);
        let font = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Build(e.to_string()))?;
        let layer = document.get_page(page_index).get_layer(layer_index);

        Ok(Self {
            document: Some(document),
            layer,
            font,
            font_size: 12.0,
            page_width: page.width,
            page_height: page.height,
            pages: 1,
            sink,
        })
    }

    /// Number of pages so far.
    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.pages
    }

    fn document(&self) -> Result<&PdfDocumentReference, PdfError> {
        self.document.as_ref().ok_or(PdfError::AlreadySaved)
    }

    /// Distance from the bottom edge for a distance from the top edge.
    fn flip(&self, y: f64) -> f64 {
        self.page_height - y
    }

    fn place_image(
        &self,
        image: &RgbaImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), PdfError> {
        self.document()?;
        let (px_width, px_height) = image.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err(PdfError::EmptyImage {
                width: px_width,
                height: px_height,
            });
        }

        let xobject = ImageXObject {
            width: Px(px_width as usize),
            height: Px(px_height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: flatten_rgb(image),
            image_filter: None,
            smask: None,
            clipping_bbox: None,
        };

        // Natural size at IMAGE_DPI, then scaled to the target box.
        let natural_width = f64::from(px_width) / IMAGE_DPI * 25.4;
        let natural_height = f64::from(px_height) / IMAGE_DPI * 25.4;

        #[expect(clippy::cast_possible_truncation)]
        let transform = ImageTransform {
            translate_x: Some(mm(x)),
            translate_y: Some(mm(self.flip(y + height))),
            scale_x: Some((width / natural_width) as f32),
            scale_y: Some((height / natural_height) as f32),
            dpi: Some(IMAGE_DPI as f32),
            ..ImageTransform::default()
        };
        Image::from(xobject).add_to_layer(self.layer.clone(), transform);
        Ok(())
    }

    fn finish(&mut self, filename: &str) -> Result<(), PdfError> {
        let document = self.document.take().ok_or(PdfError::AlreadySaved)?;
        let bytes = document
            .save_to_bytes()
            .map_err(|e| PdfError::Build(e.to_string()))?;
        self.sink
            .deliver(filename, &bytes)
            .map_err(|e| PdfError::Deliver {
                filename: filename.to_owned(),
                message: e.to_string(),
            })
    }
}

impl<S: DocumentSink> DocumentWriter for PdfWriter<S> {
    fn page_width(&self) -> f64 {
        self.page_width
    }

    fn page_height(&self) -> f64 {
        self.page_height
    }

    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    fn text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        align: TextAlign,
    ) -> Result<(), CapabilityError> {
        self.document()?;
        let width = text_width(text, self.font_size) / PT_PER_MM;
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        #[expect(clippy::cast_possible_truncation)]
        let size = self.font_size as f32;
        self.layer
            .use_text(text, size, mm(left), mm(self.flip(y)), &self.font);
        Ok(())
    }

    fn image(
        &mut self,
        image: &RgbaImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), CapabilityError> {
        Ok(self.place_image(image, x, y, width, height)?)
    }

    fn add_page(&mut self) -> Result<(), CapabilityError> {
        let (page_index, layer_index) =
            self.document()?
                .add_page(mm(self.page_width), mm(self.page_height), LAYER_NAME);
        self.layer = self.document()?.get_page(page_index).get_layer(layer_index);
        self.pages += 1;
        Ok(())
    }

    fn save(&mut self, filename: &str) -> Result<(), CapabilityError> {
        self.finish(filename)?;
        tracing::debug!(%filename, pages = self.pages, "PDF delivered");
        Ok(())
    }
}

#[expect(clippy::cast_possible_truncation)]
fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

/// Composite RGBA pixels onto white and drop the alpha channel.
#[must_use]
pub fn flatten_rgb(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.as_raw().len() / 4 * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            #[expect(clippy::cast_possible_truncation)]
            rgb.push(blended as u8);
        }
    }
    rgb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;
    use printpdf::lopdf;

    use super::*;
    use crate::sink::MemorySink;

    fn writer(sink: &MemorySink) -> PdfWriter<MemorySink> {
        PdfWriter::new(&PageGeometry::A4, &PdfMetadata::default(), sink.clone()).unwrap()
    }

    #[test]
    fn opaque_pixels_are_unchanged() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([12, 34, 56, 255]));
        assert_eq!(flatten_rgb(&image), vec![12, 34, 56, 12, 34, 56]);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_rgb(&image), vec![255, 255, 255]);
    }

    #[test]
    fn half_alpha_blends_toward_white() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        // 255 * 127 / 255 = 127
        assert_eq!(flatten_rgb(&image), vec![127, 127, 127]);
    }

    #[test]
    fn saves_every_page() {
        let sink = MemorySink::new();
        let mut pdf = writer(&sink);
        assert!((pdf.page_width() - 210.0).abs() < f64::EPSILON);
        assert!((pdf.page_height() - 297.0).abs() < f64::EPSILON);

        pdf.set_font_size(18.0);
        pdf.text("Financial Dashboard Report", 105.0, 20.0, TextAlign::Center)
            .unwrap();
        let band = RgbaImage::from_pixel(20, 10, Rgba([200, 10, 10, 255]));
        pdf.image(&band, 0.0, 40.0, 210.0, 105.0).unwrap();
        pdf.add_page().unwrap();
        pdf.image(&band, 0.0, 40.0, 210.0, 105.0).unwrap();
        assert_eq!(pdf.page_count(), 2);
        pdf.save("report.pdf").unwrap();

        let saved = sink.take();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].filename, "report.pdf");
        assert!(saved[0].bytes.starts_with(b"%PDF-"));
        let parsed = lopdf::Document::load_mem(&saved[0].bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn saves_only_once() {
        let sink = MemorySink::new();
        let mut pdf = writer(&sink);
        pdf.save("once.pdf").unwrap();
        let err = pdf.save("twice.pdf").unwrap_err();
        assert_eq!(err.message, PdfError::AlreadySaved.to_string());
        assert!(pdf.add_page().is_err());
        assert_eq!(sink.take().len(), 1);
    }

    #[test]
    fn empty_image_is_rejected() {
        let sink = MemorySink::new();
        let mut pdf = writer(&sink);
        let err = pdf
            .image(&RgbaImage::new(0, 5), 0.0, 0.0, 10.0, 10.0)
            .unwrap_err();
        assert!(err.message.contains("empty image"));
    }

    #[test]
    fn sink_failure_is_reported() {
        struct Refuse;
        impl DocumentSink for Refuse {
            type Error = &'static str;
            fn deliver(&mut self, _: &str, _: &[u8]) -> Result<(), Self::Error> {
                Err("quota exceeded")
            }
        }

        let mut pdf = PdfWriter::new(&PageGeometry::A4, &PdfMetadata::default(), Refuse).unwrap();
        let err = pdf.save("r.pdf").unwrap_err();
        assert_eq!(err.message, "could not deliver r.pdf: quota exceeded");
    }
}
