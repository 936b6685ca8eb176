//! First-page report header.

use chrono::{DateTime, FixedOffset};

use crate::capability::{DocumentWriter, TextAlign};
use crate::config::HeaderLayout;
use crate::failure::CapabilityError;

/// The three header lines of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderText {
    /// Report title.
    pub title: String,
    /// `"Generated: <date>"`.
    pub generated: String,
    /// `"Period: <label>"`.
    pub period: String,
}

impl HeaderText {
    /// Header lines for a report generated at `timestamp` covering
    /// `period_label`.
    #[must_use]
    pub fn new(
        layout: &HeaderLayout,
        period_label: &str,
        timestamp: &DateTime<FixedOffset>,
    ) -> Self {
        Self {
            title: layout.title.clone(),
            generated: format!("Generated: {}", generated_label(timestamp)),
            period: format!("Period: {period_label}"),
        }
    }
}

/// Long-form generation date in the timestamp's own offset, e.g.
/// `"October 18, 2026, 02:05 PM"`.
#[must_use]
pub fn generated_label(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%B %-d, %Y, %I:%M %p").to_string()
}

/// Write the header onto the current page, centered on its width.
///
/// # Errors
///
/// Propagates the writer's [`CapabilityError`].
pub fn write_header<W: DocumentWriter>(
    writer: &mut W,
    layout: &HeaderLayout,
    text: &HeaderText,
) -> Result<(), CapabilityError> {
    let center = writer.page_width() / 2.0;

    writer.set_font_size(layout.title_font_size);
    writer.text(&text.title, center, layout.title_y, TextAlign::Center)?;

    writer.set_font_size(layout.meta_font_size);
    writer.text(&text.generated, center, layout.generated_y, TextAlign::Center)?;
    writer.text(&text.period, center, layout.period_y, TextAlign::Center)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn header_lines() {
        let ts = Utc
            .with_ymd_and_hms(2026, 10, 18, 14, 5, 9)
            .unwrap()
            .fixed_offset();
        let text = HeaderText::new(&HeaderLayout::default(), "Last 7 Days", &ts);
        assert_eq!(text.title, "Financial Dashboard Report");
        assert_eq!(text.generated, "Generated: October 18, 2026, 02:05 PM");
        assert_eq!(text.period, "Period: Last 7 Days");
    }

    #[test]
    fn single_digit_day_is_not_padded() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        assert_eq!(generated_label(&ts.fixed_offset()), "March 4, 2026, 09:00 AM");
    }

    #[test]
    fn generated_label_uses_local_offset() {
        let utc = Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 9).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            generated_label(&utc.with_timezone(&new_york)),
            "October 18, 2026, 10:05 AM"
        );
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            generated_label(&utc.with_timezone(&tokyo)),
            "October 18, 2026, 11:05 PM"
        );
    }
}
