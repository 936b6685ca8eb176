//! folio-pipeline: Dashboard-to-PDF export pipeline (sans-IO).
//!
//! Turns an on-screen dashboard region into a paginated report:
//! guard -> settle -> sanitize -> capture (with retry) -> lay out ->
//! header -> bands -> save, with failure classification and a print
//! fallback.
//!
//! This crate has **no I/O dependencies**.  The screenshot capability,
//! the document writer and the host (timers, style layers, dialogs) are
//! injected through the traits in [`capability`].  Browser bindings live
//! in `folio-io`, the PDF writer in `folio-pdf`.

pub mod capability;
pub mod color;
pub mod config;
pub mod failure;
pub mod guard;
pub mod header;
pub mod layout;
pub mod naming;
mod pipeline;
pub mod sanitize;
pub mod types;

pub use capability::{
    CaptureOptions, DocumentWriter, Environment, Screenshot, ScreenshotProvider, TextAlign,
};
pub use color::Rgb;
pub use config::{ConfigError, ExportConfig, HeaderLayout, PageGeometry};
pub use failure::{CapabilityError, CapabilityErrorKind, FallbackPolicy};
pub use guard::{ExportGuard, InFlight};
pub use sanitize::SanitizeRules;
pub use types::{
    CaptureResult, ColorMode, Dimensions, ExportOutcome, ExportRequest, Fallback, FailureReason,
    RgbaImage,
};

use failure::PRINT_PROMPT_SUFFIX;

/// Run one export.
///
/// # Pipeline steps
///
/// 1. Claim the in-flight guard (refuse overlapping exports)
/// 2. Check the target region is mounted and non-empty
/// 3. Wait for the settle delay
/// 4. Inject the sanitizing style layer
/// 5. Load the screenshot capability and capture, with retry
/// 6. Plan pages, write the header, place one band per page
/// 7. Save under the generated file name
/// 8. Remove the style layer (always, once injected)
/// 9. On failure, classify and apply the print fallback
///
/// Never returns an error: every failure is folded into
/// [`ExportOutcome::Failed`].  The guard is released before returning.
pub async fn export<E: Environment>(
    env: &mut E,
    guard: &ExportGuard,
    request: ExportRequest<E::Region>,
    config: &ExportConfig,
) -> ExportOutcome {
    // 1. Guard.
    let Some(_claim) = guard.try_claim() else {
        tracing::debug!("export already in flight");
        return ExportOutcome::Failed {
            reason: FailureReason::Busy,
            fallback: Fallback::NotOffered,
        };
    };

    // 2. Target region.
    let Some(region) = request.region.as_ref().filter(|r| env.is_ready(r)) else {
        tracing::warn!("export target is not ready");
        return ExportOutcome::Failed {
            reason: FailureReason::TargetNotReady,
            fallback: Fallback::NotOffered,
        };
    };

    tracing::info!(
        mode = ?request.color_mode,
        period = %request.period_label,
        "starting export"
    );

    // 3-8.
    match pipeline::run(env, region, &request, config).await {
        Ok(outcome) => outcome,
        // 9. Classification and fallback.
        Err(reason) => {
            tracing::error!(?reason, "export failed: {}", reason.user_message());
            let fallback = fall_back(env, &reason);
            ExportOutcome::Failed { reason, fallback }
        }
    }
}

/// Apply the print fallback policy of `reason`.
fn fall_back<E: Environment>(env: &mut E, reason: &FailureReason) -> Fallback {
    match reason.fallback_policy() {
        FallbackPolicy::Skip => Fallback::NotOffered,
        FallbackPolicy::Automatic => {
            env.print();
            Fallback::Printed
        }
        FallbackPolicy::Prompt => {
            let prompt = format!("{}{PRINT_PROMPT_SUFFIX}", reason.user_message());
            let accepted = env.confirm(&prompt);
            if accepted {
                env.print();
            }
            Fallback::Offered { accepted }
        }
    }
}
