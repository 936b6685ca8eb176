//! Steps of an export run, between guard entry and fallback handling.
//!
//! Every function here reports failure as a [`FailureReason`]; nothing
//! returns a raw [`CapabilityError`] to [`export`](crate::export).

use std::borrow::Cow;
use std::time::Duration;

use chrono::Utc;

use crate::capability::{
    CaptureOptions, DocumentWriter, Environment, Screenshot, ScreenshotProvider,
};
use crate::config::ExportConfig;
use crate::failure::CapabilityError;
use crate::header::{HeaderText, write_header};
use crate::layout::{band_image, plan_pages};
use crate::naming::export_filename;
use crate::sanitize::SanitizeRules;
use crate::types::{CaptureResult, ExportOutcome, ExportRequest, FailureReason};

/// Settle, sanitize, capture, lay out and emit.
///
/// The style layer injected in the sanitize step is removed before this
/// function returns, whether the later steps succeeded or not.
pub(crate) async fn run<E: Environment>(
    env: &mut E,
    region: &E::Region,
    request: &ExportRequest<E::Region>,
    config: &ExportConfig,
) -> Result<ExportOutcome, FailureReason> {
    config
        .validate()
        .map_err(|e| FailureReason::Generic(e.to_string()))?;

    tracing::debug!(delay = ?config.settle_delay, "settling before capture");
    env.sleep(config.settle_delay).await;

    let rules = SanitizeRules::for_mode(request.color_mode);
    let layer = env
        .inject_style(&rules.style_layer_css())
        .map_err(|e| FailureReason::from_document_error(&e))?;
    tracing::debug!("sanitize style layer injected");

    let result = render(env, region, request, config, rules).await;

    env.remove_style(layer);
    tracing::debug!("sanitize style layer removed");

    result
}

/// Capture the region and write the document.
async fn render<E: Environment>(
    env: &mut E,
    region: &E::Region,
    request: &ExportRequest<E::Region>,
    config: &ExportConfig,
    rules: SanitizeRules,
) -> Result<ExportOutcome, FailureReason> {
    let options = CaptureOptions {
        scale: config.pixel_scale,
        allow_cross_origin: config.allow_cross_origin,
        background: config.background(request.color_mode),
        rules,
    };
    let capture = capture_with_retry(env, region, &options, config).await?;
    let dimensions = capture.dimensions();
    tracing::debug!(
        width = dimensions.width,
        height = dimensions.height,
        "region captured"
    );

    let document_error = |e: CapabilityError| FailureReason::from_document_error(&e);

    let mut writer = env.new_document(&config.page).map_err(document_error)?;
    let slices = plan_pages(
        dimensions,
        writer.page_width(),
        writer.page_height(),
        &config.page,
    )
    .map_err(|e| FailureReason::Generic(e.to_string()))?;
    tracing::debug!(pages = slices.len(), "layout planned");

    let header = HeaderText::new(&config.header, &request.period_label, &request.timestamp);
    write_header(&mut writer, &config.header, &header).map_err(document_error)?;

    for (index, slice) in slices.iter().enumerate() {
        if index > 0 {
            writer.add_page().map_err(document_error)?;
        }
        // Yield before re-encoding each band so the UI stays responsive.
        env.sleep(Duration::ZERO).await;

        let band = if slice.band.source_y == 0 && slice.band.source_height == dimensions.height {
            Cow::Borrowed(&capture.image)
        } else {
            Cow::Owned(band_image(&capture.image, slice.band))
        };
        writer
            .image(&band, slice.x, slice.y, slice.width, slice.height)
            .map_err(document_error)?;
    }

    let filename = export_filename(
        &config.filename_prefix,
        &request.period_label,
        &request.timestamp.with_timezone(&Utc),
    );
    writer.save(&filename).map_err(document_error)?;
    tracing::info!(%filename, pages = slices.len(), "report saved");

    Ok(ExportOutcome::Saved {
        filename,
        pages: slices.len(),
    })
}

/// Load the capability and capture, retrying with a fixed backoff.
///
/// Color-function failures are not retried.  Any other failure that
/// survives every attempt becomes [`FailureReason::CaptureUnavailable`].
async fn capture_with_retry<E: Environment>(
    env: &mut E,
    region: &E::Region,
    options: &CaptureOptions,
    config: &ExportConfig,
) -> Result<CaptureResult, FailureReason> {
    let attempts = config.capture_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match try_capture(env, region, options).await {
            Ok(capture) => return Ok(capture),
            Err(error) => {
                tracing::warn!(
                    attempt,
                    attempts,
                    kind = ?error.kind,
                    "capture attempt failed: {error}"
                );
                if !error.is_retryable() {
                    return Err(FailureReason::from_capture_error(&error));
                }
                last_error = Some(error);
                if attempt < attempts {
                    env.sleep(config.retry_backoff).await;
                }
            }
        }
    }

    Err(last_error.map_or(FailureReason::CaptureUnavailable, |error| {
        FailureReason::from_capture_error(&error)
    }))
}

/// One load + capture attempt.
async fn try_capture<E: Environment>(
    env: &mut E,
    region: &E::Region,
    options: &CaptureOptions,
) -> Result<CaptureResult, CapabilityError> {
    let mut screenshot = env.screenshot_provider().load().await?;
    let capture = screenshot.capture(region, options).await?;
    if capture.is_empty() {
        return Err(CapabilityError::other("capture produced an empty image"));
    }
    Ok(capture)
}
