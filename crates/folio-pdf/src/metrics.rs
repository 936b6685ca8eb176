//! Helvetica advance widths, for aligning text without embedding a font.
//!
//! Widths are in thousandths of an em, from the standard Helvetica AFM,
//! for the printable ASCII range.

/// Advance widths for `' '..='~'`.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Width used for characters outside the table.
const FALLBACK_WIDTH: u16 = 556;

/// Advance width of one character, in thousandths of an em.
#[must_use]
pub fn char_width(c: char) -> u16 {
    let code = u32::from(c);
    if (0x20..0x7f).contains(&code) {
        HELVETICA_ASCII[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Width of `text` set in Helvetica at `font_size` points, in points.
#[must_use]
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    f64::from(units) * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_printable_ascii() {
        assert_eq!(char_width(' '), 278);
        assert_eq!(char_width('0'), 556);
        assert_eq!(char_width('@'), 1015);
        assert_eq!(char_width('W'), 944);
        assert_eq!(char_width('i'), 222);
        assert_eq!(char_width('~'), 584);
    }

    #[test]
    fn unknown_characters_use_fallback() {
        assert_eq!(char_width('\u{e9}'), FALLBACK_WIDTH);
        assert_eq!(char_width('\n'), FALLBACK_WIDTH);
    }

    #[test]
    fn width_scales_with_font_size() {
        let at_ten = text_width("Period", 10.0);
        let at_twenty = text_width("Period", 20.0);
        assert!((at_twenty - 2.0 * at_ten).abs() < 1e-9);
        // P(667) e(556) r(333) i(222) o(556) d(556) = 2890
        assert!((at_ten - 28.9).abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_no_width() {
        assert!(text_width("", 18.0).abs() < f64::EPSILON);
    }
}
