//! Collaborator failures and how they surface to the user.
//!
//! Collaborators report a typed [`CapabilityError`].  Only the browser
//! boundary, where failures arrive as opaque exception text, should use
//! [`CapabilityError::from_message`] to recover the kind.
//!
//! The pipeline turns the final error into a [`FailureReason`], and each
//! reason carries a user-facing message and a print-fallback policy.

use crate::types::FailureReason;

/// Lower-case substrings identifying a library or capability that
/// failed to load.
const LOAD_FAILURE_MARKERS: &[&str] = &[
    "failed to load",
    "libraries failed to load",
    "is not defined",
    "is not a function",
];

/// Lower-case substrings identifying a color function the rasterizer
/// rejected.
const COLOR_FUNCTION_MARKERS: &[&str] = &[
    "oklch",
    "oklab",
    "color-mix",
    "unsupported color",
    "color function",
];

/// Common prefix of every failure message.
pub const MESSAGE_PREFIX: &str = "Failed to generate PDF. ";

/// Appended to the message when asking the user about the print fallback.
pub const PRINT_PROMPT_SUFFIX: &str = "\n\nWould you like to use browser print instead?";

/// Broad category of a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityErrorKind {
    /// The capability, or a library it depends on, is not available.
    LoadFailed,
    /// The capability hit a CSS color function it cannot parse.
    ColorFunction,
    /// Anything else.
    Other,
}

/// A failure reported by the screenshot capability, the document
/// writer, or the host environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CapabilityError {
    /// Category of the failure.
    pub kind: CapabilityErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl CapabilityError {
    /// Create an error of the given kind.
    pub fn new(kind: CapabilityErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The capability or one of its libraries could not be loaded.
    pub fn load_failed(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::LoadFailed, message)
    }

    /// A color function could not be parsed.
    pub fn color_function(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::ColorFunction, message)
    }

    /// Any other failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::Other, message)
    }

    /// Classify an opaque exception message.
    ///
    /// Color-function markers take precedence over load markers.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let kind = if COLOR_FUNCTION_MARKERS.iter().any(|m| lower.contains(m)) {
            CapabilityErrorKind::ColorFunction
        } else if LOAD_FAILURE_MARKERS.iter().any(|m| lower.contains(m)) {
            CapabilityErrorKind::LoadFailed
        } else {
            CapabilityErrorKind::Other
        };
        Self { kind, message }
    }

    /// Whether retrying the capture can help.
    ///
    /// Color-function failures are deterministic for a given page.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self.kind, CapabilityErrorKind::ColorFunction)
    }
}

/// How the print fallback is offered for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Nothing to fall back from (the export never started).
    Skip,
    /// Open the print dialog without asking.
    Automatic,
    /// Ask the user first.
    Prompt,
}

impl FailureReason {
    /// Reason for an error that survived every capture attempt.
    #[must_use]
    pub fn from_capture_error(error: &CapabilityError) -> Self {
        match error.kind {
            CapabilityErrorKind::ColorFunction => Self::ColorIncompatibility,
            CapabilityErrorKind::LoadFailed | CapabilityErrorKind::Other => {
                Self::CaptureUnavailable
            }
        }
    }

    /// Reason for an error raised outside the capture step (style
    /// layer, document writer, save).
    #[must_use]
    pub fn from_document_error(error: &CapabilityError) -> Self {
        match error.kind {
            CapabilityErrorKind::LoadFailed => Self::CaptureUnavailable,
            CapabilityErrorKind::ColorFunction => Self::ColorIncompatibility,
            CapabilityErrorKind::Other => Self::Generic(error.message.clone()),
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        let detail = match self {
            Self::Busy => "An export is already in progress.",
            Self::TargetNotReady => "The dashboard is not ready to be exported yet.",
            Self::CaptureUnavailable => "Please refresh the page and try again.",
            Self::ColorIncompatibility => {
                "Screen capture failed due to CSS compatibility. Try using browser print instead."
            }
            Self::Generic(message) => message.as_str(),
        };
        format!("{MESSAGE_PREFIX}{detail}")
    }

    /// Whether and how to offer the print fallback.
    #[must_use]
    pub const fn fallback_policy(&self) -> FallbackPolicy {
        match self {
            Self::Busy | Self::TargetNotReady => FallbackPolicy::Skip,
            Self::ColorIncompatibility => FallbackPolicy::Automatic,
            Self::CaptureUnavailable | Self::Generic(_) => FallbackPolicy::Prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_color_function_messages() {
        let err = CapabilityError::from_message(
            "Attempting to parse an unsupported color function \"oklch\"",
        );
        assert_eq!(err.kind, CapabilityErrorKind::ColorFunction);
        assert!(!err.is_retryable());
    }

    #[test]
    fn classifies_load_failures() {
        let err = CapabilityError::from_message("PDF libraries failed to load. Please refresh.");
        assert_eq!(err.kind, CapabilityErrorKind::LoadFailed);
        assert!(err.is_retryable());

        let err = CapabilityError::from_message("ReferenceError: html2canvas is not defined");
        assert_eq!(err.kind, CapabilityErrorKind::LoadFailed);
    }

    #[test]
    fn unknown_messages_are_other() {
        let err = CapabilityError::from_message("canvas exceeds max size");
        assert_eq!(err.kind, CapabilityErrorKind::Other);
        assert_eq!(err.to_string(), "canvas exceeds max size");
    }

    #[test]
    fn capture_errors_map_to_unavailable_or_color() {
        assert_eq!(
            FailureReason::from_capture_error(&CapabilityError::other("boom")),
            FailureReason::CaptureUnavailable
        );
        assert_eq!(
            FailureReason::from_capture_error(&CapabilityError::load_failed("gone")),
            FailureReason::CaptureUnavailable
        );
        assert_eq!(
            FailureReason::from_capture_error(&CapabilityError::color_function("oklch")),
            FailureReason::ColorIncompatibility
        );
    }

    #[test]
    fn document_errors_keep_their_message() {
        assert_eq!(
            FailureReason::from_document_error(&CapabilityError::other("disk full")),
            FailureReason::Generic("disk full".into())
        );
        assert_eq!(
            FailureReason::from_document_error(&CapabilityError::load_failed("jspdf")),
            FailureReason::CaptureUnavailable
        );
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            FailureReason::CaptureUnavailable.user_message(),
            "Failed to generate PDF. Please refresh the page and try again."
        );
        assert_eq!(
            FailureReason::Generic("disk full".into()).user_message(),
            "Failed to generate PDF. disk full"
        );
        assert!(
            FailureReason::ColorIncompatibility
                .user_message()
                .contains("CSS compatibility")
        );
    }

    #[test]
    fn fallback_policies() {
        assert_eq!(
            FailureReason::ColorIncompatibility.fallback_policy(),
            FallbackPolicy::Automatic
        );
        assert_eq!(
            FailureReason::CaptureUnavailable.fallback_policy(),
            FallbackPolicy::Prompt
        );
        assert_eq!(
            FailureReason::Generic(String::new()).fallback_policy(),
            FallbackPolicy::Prompt
        );
        assert_eq!(FailureReason::Busy.fallback_policy(), FallbackPolicy::Skip);
        assert_eq!(
            FailureReason::TargetNotReady.fallback_policy(),
            FallbackPolicy::Skip
        );
    }
}
