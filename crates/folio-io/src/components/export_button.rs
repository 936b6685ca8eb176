//! Export button that turns a dashboard element into a PDF download.

use std::rc::Rc;

use dioxus::prelude::*;
use folio_pipeline::{ColorMode, ExportConfig, ExportGuard, ExportOutcome, ExportRequest};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::env::BrowserEnvironment;

/// Props for the [`ExportButton`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ExportButtonProps {
    /// `id` of the element to capture.
    target_id: String,
    /// Theme the dashboard is rendered in.
    color_mode: ColorMode,
    /// Label of the selected reporting period.
    period_label: String,
    /// Export tuning; defaults apply when omitted.
    #[props(default)]
    config: ExportConfig,
}

/// Look up the capture target by id.
fn find_target(id: &str) -> Option<HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlElement>()
        .ok()
}

/// "Export PDF" button.
///
/// Owns the [`ExportGuard`] for its dashboard, so repeated clicks while
/// an export runs are refused rather than queued.  The button is
/// disabled and reads "Exporting..." in the meantime.
#[component]
pub fn ExportButton(props: ExportButtonProps) -> Element {
    let guard = use_hook(|| Rc::new(ExportGuard::new()));
    let mut exporting = use_signal(|| false);
    let mut export_error = use_signal(|| Option::<String>::None);

    let onclick = {
        let ExportButtonProps {
            target_id,
            color_mode,
            period_label,
            config,
        } = props;
        move |_| {
            let guard = Rc::clone(&guard);
            let target_id = target_id.clone();
            let period_label = period_label.clone();
            let config = config.clone();
            spawn(async move {
                exporting.set(true);
                let request = ExportRequest::new(find_target(&target_id), color_mode, period_label);
                let mut env = BrowserEnvironment::new();
                let outcome = folio_pipeline::export(&mut env, &guard, request, &config).await;
                exporting.set(guard.is_in_flight());

                match outcome {
                    ExportOutcome::Saved { .. } => export_error.set(None),
                    ExportOutcome::Failed { reason, .. } => {
                        let message = reason.user_message();
                        web_sys::console::error_1(&format!("PDF Generation Error: {message}").into());
                        if reason != folio_pipeline::FailureReason::Busy {
                            export_error.set(Some(message));
                        }
                    }
                }
            });
        }
    };

    let busy = exporting();
    let class = if busy {
        "px-4 py-2 bg-[var(--btn-disabled)] rounded text-[var(--text-disabled)] cursor-wait"
    } else {
        "px-4 py-2 bg-[var(--btn-primary)] hover:bg-[var(--btn-primary-hover)] rounded text-white font-medium transition-colors cursor-pointer"
    };
    let label = if busy { "Exporting..." } else { "Export PDF" };

    rsx! {
        div { class: "space-y-2", "data-ignore-pdf": "true",
            button {
                class: "{class}",
                disabled: busy,
                onclick,
                "{label}"
            }
            if let Some(ref err) = export_error() {
                p { class: "text-[var(--text-error)] text-sm", "{err}" }
            }
        }
    }
}
