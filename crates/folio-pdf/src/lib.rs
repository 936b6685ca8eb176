//! folio-pdf: PDF document writer for folio reports.
//!
//! Implements the pipeline's [`DocumentWriter`](folio_pipeline::DocumentWriter)
//! on top of `printpdf`.  The writer builds the document in memory and
//! hands the finished bytes to a [`DocumentSink`]; it never touches the
//! file system or the DOM itself.

pub mod metrics;
pub mod sink;
pub mod writer;

pub use sink::{DocumentSink, MemorySink, SavedDocument};
pub use writer::{PdfError, PdfMetadata, PdfWriter, flatten_rgb};
