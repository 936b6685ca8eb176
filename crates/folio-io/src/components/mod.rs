//! Dioxus UI components for folio.

mod export_button;

pub use export_button::ExportButton;
