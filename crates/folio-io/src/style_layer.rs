//! Temporary `<style>` element holding the sanitizing rules.
//!
//! The element is tagged with [`STYLE_LAYER_ATTRIBUTE`] so a stale
//! layer left behind by a crashed tab is easy to spot in devtools.

use folio_pipeline::sanitize::STYLE_LAYER_ATTRIBUTE;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlStyleElement;

/// Errors raised while attaching a style layer.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// A required global (window, document, head) is missing.
    #[error("missing {0}")]
    Missing(&'static str),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// An attached style layer.  Dropping the handle leaves the element in
/// place; call [`StyleLayer::remove`].
#[derive(Debug)]
pub struct StyleLayer {
    element: HtmlStyleElement,
}

impl StyleLayer {
    /// Append a `<style>` element holding `css` to `document.head`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError`] if the document has no head or the element
    /// cannot be created.
    pub fn inject(css: &str) -> Result<Self, DomError> {
        let document = web_sys::window()
            .ok_or(DomError::Missing("window"))?
            .document()
            .ok_or(DomError::Missing("document"))?;
        let head = document.head().ok_or(DomError::Missing("document head"))?;

        let element: HtmlStyleElement = document
            .create_element("style")?
            .dyn_into()
            .map_err(|e| DomError::JsError(format!("failed to cast element: {e:?}")))?;
        element.set_attribute(STYLE_LAYER_ATTRIBUTE, "")?;
        element.set_text_content(Some(css));
        head.append_child(&element)?;

        Ok(Self { element })
    }

    /// Detach the element from the document.
    pub fn remove(self) {
        self.element.remove();
    }
}
