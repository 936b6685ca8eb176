//! Output file names.
//!
//! `<prefix>-<period-slug>-<YYYY-MM-DD_HH-MM-SS>.pdf`: deterministic for
//! a given label and timestamp, free of `:`, path separators and
//! whitespace, and distinct across exports made in different seconds.

use chrono::{DateTime, Utc};

/// Lower-case the period label and join its words with `-`.
///
/// Whitespace and path separators (`/`, `\`) split words, so a label
/// like `"Q1/Q2"` cannot name a file outside the download directory.
/// Leading and trailing separators are dropped and runs collapse to a
/// single hyphen.
#[must_use]
pub fn period_slug(label: &str) -> String {
    label
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, '/' | '\\'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// ISO-8601 timestamp (UTC, whole seconds) made filesystem safe:
/// `:` becomes `-` and the date/time separator `T` becomes `_`.
#[must_use]
pub fn file_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
        .replace(':', "-")
        .replace('T', "_")
}

/// Full file name for an export.
///
/// An empty slug is left out rather than producing a double hyphen.
#[must_use]
pub fn export_filename(prefix: &str, period_label: &str, timestamp: &DateTime<Utc>) -> String {
    let slug = period_slug(period_label);
    let stamp = file_timestamp(timestamp);
    if slug.is_empty() {
        format!("{prefix}-{stamp}.pdf")
    } else {
        format!("{prefix}-{slug}-{stamp}.pdf")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 9).unwrap()
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(period_slug("Last 30 Days"), "last-30-days");
        assert_eq!(period_slug("  Q3\t 2026 "), "q3-2026");
        assert_eq!(period_slug(""), "");
    }

    #[test]
    fn slug_replaces_path_separators() {
        assert_eq!(period_slug("Q1/Q2"), "q1-q2");
        assert_eq!(period_slug(r"H1 \ H2"), "h1-h2");
        assert_eq!(period_slug("/../"), "..");
        let name = export_filename("report", "Q1/Q2 2026", &stamp());
        assert_eq!(name, "report-q1-q2-2026-2026-10-18_14-05-09.pdf");
        assert!(!name.contains(['/', '\\']));
    }

    #[test]
    fn timestamp_has_no_colons() {
        assert_eq!(file_timestamp(&stamp()), "2026-10-18_14-05-09");
    }

    #[test]
    fn filename_is_deterministic_and_safe() {
        let a = export_filename("financial-dashboard", "Last 30 Days", &stamp());
        let b = export_filename("financial-dashboard", "Last 30 Days", &stamp());
        assert_eq!(a, b);
        assert_eq!(a, "financial-dashboard-last-30-days-2026-10-18_14-05-09.pdf");
        assert!(!a.contains(':'));
        assert!(!a.chars().any(char::is_whitespace));
    }

    #[test]
    fn filenames_differ_across_seconds() {
        let later = stamp() + chrono::Duration::seconds(1);
        assert_ne!(
            export_filename("report", "1Y", &stamp()),
            export_filename("report", "1Y", &later)
        );
    }

    #[test]
    fn empty_label_skips_slug() {
        assert_eq!(
            export_filename("report", "   ", &stamp()),
            "report-2026-10-18_14-05-09.pdf"
        );
    }
}
