//! folio-io: Browser bindings and Dioxus components for folio.
//!
//! Implements the pipeline's host traits against the live page: the
//! `html2canvas` screenshot capability, the temporary sanitize style
//! layer, timers, native dialogs, and Blob downloads of the finished
//! PDF.  Also provides the `ExportButton` component.
//!
//! Everything here requires a browser environment
//! (`wasm32-unknown-unknown` target).

pub mod components;
pub mod dialog;
pub mod download;
pub mod env;
pub mod screenshot;
pub mod style_layer;

pub use components::ExportButton;
pub use download::{BrowserSink, DownloadError, trigger_download};
pub use env::BrowserEnvironment;
pub use screenshot::{Html2Canvas, Html2CanvasProvider};
pub use style_layer::{DomError, StyleLayer};
