//! Native browser dialogs: `confirm` and `print`.
//!
//! Both degrade quietly when there is no window (for example in a
//! worker): `confirm` answers `false` and `print` does nothing.

/// Ask a yes/no question with `window.confirm`.
#[must_use]
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Open the print dialog with `window.print`.
pub fn print() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.print() {
        tracing::warn!("window.print failed: {e:?}");
    }
}
