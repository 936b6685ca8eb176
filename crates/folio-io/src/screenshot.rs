//! Screenshot capability backed by the page's global `html2canvas`.
//!
//! The library is expected to be loaded by a `<script>` tag.  If the
//! global is missing when an export starts, [`Html2CanvasProvider::load`]
//! reports a load failure and the pipeline retries it with the capture.
//!
//! Failures thrown by the library arrive as opaque JS values and are
//! classified by message with [`CapabilityError::from_message`].

use folio_pipeline::sanitize::{CLONE_RESETS, ComputedColors, ElementInfo, IGNORE_ATTRIBUTE};
use folio_pipeline::{
    CapabilityError, CaptureOptions, CaptureResult, RgbaImage, SanitizeRules, Screenshot,
    ScreenshotProvider,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement};

/// Name of the global capture function.
pub const HTML2CANVAS_GLOBAL: &str = "html2canvas";

/// Best-effort text of a thrown JS value.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Resolves the `html2canvas` global on each export.
#[derive(Debug, Clone)]
pub struct Html2CanvasProvider {
    global: String,
}

impl Html2CanvasProvider {
    /// Provider for the default global name.
    #[must_use]
    pub fn new() -> Self {
        Self::with_global(HTML2CANVAS_GLOBAL)
    }

    /// Provider for a capture function exposed under another name.
    #[must_use]
    pub fn with_global(global: impl Into<String>) -> Self {
        Self {
            global: global.into(),
        }
    }
}

impl Default for Html2CanvasProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenshotProvider for Html2CanvasProvider {
    type Region = HtmlElement;
    type Screenshot = Html2Canvas;

    async fn load(&mut self) -> Result<Html2Canvas, CapabilityError> {
        let window = web_sys::window()
            .ok_or_else(|| CapabilityError::load_failed("no global window"))?;
        let function = js_sys::Reflect::get(&window, &JsValue::from_str(&self.global))
            .map_err(|e| CapabilityError::load_failed(js_error_message(&e)))?;
        if !function.is_function() {
            return Err(CapabilityError::load_failed(format!(
                "{} is not defined",
                self.global
            )));
        }
        Ok(Html2Canvas {
            function: function.unchecked_into(),
        })
    }
}

/// A resolved `html2canvas` function.
#[derive(Debug, Clone)]
pub struct Html2Canvas {
    function: js_sys::Function,
}

impl Screenshot for Html2Canvas {
    type Region = HtmlElement;

    async fn capture(
        &mut self,
        region: &HtmlElement,
        options: &CaptureOptions,
    ) -> Result<CaptureResult, CapabilityError> {
        let js_error = |e: JsValue| CapabilityError::from_message(js_error_message(&e));

        let rules = options.rules;
        let ignore_elements =
            Closure::<dyn FnMut(Element) -> bool>::new(move |element: Element| {
                rules.excludes(&ElementInfo {
                    tag_name: &element.tag_name(),
                    class_name: &element.class_name(),
                    ignore_attribute: element.has_attribute(IGNORE_ATTRIBUTE),
                })
            });
        let on_clone = Closure::<dyn FnMut(Document, HtmlElement)>::new(
            move |document: Document, element: HtmlElement| {
                sanitize_clone(&document, &element, rules);
            },
        );

        let settings = js_sys::Object::new();
        let set = |key: &str, value: &JsValue| {
            js_sys::Reflect::set(&settings, &JsValue::from_str(key), value).map(drop)
        };
        set("scale", &JsValue::from_f64(options.scale)).map_err(js_error)?;
        set("useCORS", &JsValue::from_bool(options.allow_cross_origin)).map_err(js_error)?;
        set("allowTaint", &JsValue::FALSE).map_err(js_error)?;
        set(
            "backgroundColor",
            &JsValue::from_str(&options.background.to_string()),
        )
        .map_err(js_error)?;
        set("logging", &JsValue::FALSE).map_err(js_error)?;
        set("removeContainer", &JsValue::TRUE).map_err(js_error)?;
        set("foreignObjectRendering", &JsValue::FALSE).map_err(js_error)?;
        set("ignoreElements", ignore_elements.as_ref()).map_err(js_error)?;
        set("onclone", on_clone.as_ref()).map_err(js_error)?;

        let promise: js_sys::Promise = self
            .function
            .call2(&JsValue::NULL, region, &settings)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| CapabilityError::other("html2canvas did not return a promise"))?;
        let canvas = JsFuture::from(promise).await.map_err(js_error)?;

        // The callbacks must outlive the promise.
        drop(ignore_elements);
        drop(on_clone);

        let canvas: HtmlCanvasElement = canvas
            .dyn_into()
            .map_err(|_| CapabilityError::other("html2canvas did not return a canvas"))?;
        canvas_to_image(&canvas).map(CaptureResult::new)
    }
}

/// Read every pixel of `canvas` into an RGBA image.
fn canvas_to_image(canvas: &HtmlCanvasElement) -> Result<RgbaImage, CapabilityError> {
    let js_error = |e: JsValue| CapabilityError::from_message(js_error_message(&e));

    let (width, height) = (canvas.width(), canvas.height());
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(js_error)?
        .ok_or_else(|| CapabilityError::other("canvas has no 2d context"))?
        .dyn_into()
        .map_err(|_| CapabilityError::other("2d context has an unexpected type"))?;
    let data = context
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(js_error)?;

    RgbaImage::from_raw(width, height, data.data().0)
        .ok_or_else(|| CapabilityError::other("canvas pixel buffer has the wrong length"))
}

/// Clone pass run by `html2canvas` on its detached copy of the page.
fn sanitize_clone(document: &Document, root: &HtmlElement, rules: SanitizeRules) {
    let Some(view) = document.default_view() else {
        return;
    };
    let Ok(elements) = document.query_selector_all("*") else {
        return;
    };

    for index in 0..elements.length() {
        let Some(element) = elements
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let style = element.style();
        for (property, value) in CLONE_RESETS {
            let _ = style.set_property(property, value);
        }

        let Ok(Some(computed)) = view.get_computed_style(&element) else {
            continue;
        };
        let background = computed
            .get_property_value("background-color")
            .unwrap_or_default();
        let text = computed.get_property_value("color").unwrap_or_default();
        let border = computed
            .get_property_value("border-color")
            .unwrap_or_default();
        let colors = ComputedColors {
            background: &background,
            text: &text,
            border: &border,
        };
        for (property, color) in rules.clone_overrides(&colors) {
            let _ = style.set_property(property.css_name(), &color.to_string());
        }
    }

    if let Some(body) = document.body() {
        let style = body.style();
        let _ = style.set_property("transform", "scale(1)");
        let _ = style.set_property("transform-origin", "top left");
        let _ = style.set_property("width", &format!("{}px", root.scroll_width()));
        let _ = style.set_property("height", &format!("{}px", root.scroll_height()));
    }
}
