//! Sanitize rules applied around the capture.
//!
//! Two passes share these rules:
//!
//! 1. A temporary style layer injected into the live page before capture
//!    (see [`SanitizeRules::style_layer_css`]).  It hides spinners and
//!    opted-out elements, freezes transitions/animations/filters, and
//!    pins the dashboard's utility color classes to plain hex values.
//! 2. A clone pass the screenshot capability runs inside its detached
//!    copy of the DOM (see [`SanitizeRules::clone_overrides`]), which
//!    replaces any computed color the rasterizer cannot parse with a
//!    fixed hex fallback for the current [`ColorMode`].

use std::fmt::Write;

use crate::color::{Rgb, uses_unsupported_color_function};
use crate::types::ColorMode;

/// Attribute set on the injected `<style>` element so it can be found
/// (and verified absent) later.
pub const STYLE_LAYER_ATTRIBUTE: &str = "data-folio-sanitize";

/// Attribute that opts an element out of the capture.
pub const IGNORE_ATTRIBUTE: &str = "data-ignore-pdf";

/// Classes whose elements are left out of the capture.
pub const EXCLUDED_CLASSES: &[&str] = &["animate-spin"];

/// Inline style resets applied to every element of the capture clone.
pub const CLONE_RESETS: &[(&str, &str)] = &[
    ("color-scheme", "normal"),
    ("filter", "none"),
    ("transition", "none"),
    ("animation", "none"),
];

/// A color-bearing CSS property the sanitizer may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProperty {
    /// `background-color`
    Background,
    /// `color`
    Text,
    /// `border-color`
    Border,
}

impl ColorProperty {
    /// All properties, in override order.
    pub const ALL: [Self; 3] = [Self::Background, Self::Text, Self::Border];

    /// CSS property name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Background => "background-color",
            Self::Text => "color",
            Self::Border => "border-color",
        }
    }
}

/// A utility class pinned to a plain hex color by the style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Class name without the leading dot.
    pub class: &'static str,
    /// Property the class sets.
    pub property: ColorProperty,
    /// Hex value forced while capturing.
    pub color: Rgb,
}

const fn entry(class: &'static str, property: ColorProperty, color: u32) -> PaletteEntry {
    PaletteEntry {
        class,
        property,
        color: Rgb::from_u32(color),
    }
}

/// Dashboard utility classes and their sRGB equivalents.
pub const PALETTE: &[PaletteEntry] = &[
    entry("bg-white", ColorProperty::Background, 0x00ff_ffff),
    entry("bg-gray-50", ColorProperty::Background, 0x00f9_fafb),
    entry("bg-gray-100", ColorProperty::Background, 0x00f3_f4f6),
    entry("bg-gray-800", ColorProperty::Background, 0x001f_2937),
    entry("bg-gray-900", ColorProperty::Background, 0x0011_1827),
    entry("bg-blue-600", ColorProperty::Background, 0x0025_63eb),
    entry("bg-green-600", ColorProperty::Background, 0x0016_a34a),
    entry("text-white", ColorProperty::Text, 0x00ff_ffff),
    entry("text-gray-900", ColorProperty::Text, 0x0011_1827),
    entry("text-gray-700", ColorProperty::Text, 0x0037_4151),
    entry("text-gray-500", ColorProperty::Text, 0x006b_7280),
    entry("text-gray-300", ColorProperty::Text, 0x00d1_d5db),
    entry("text-blue-600", ColorProperty::Text, 0x0025_63eb),
    entry("text-green-500", ColorProperty::Text, 0x0010_b981),
    entry("text-red-500", ColorProperty::Text, 0x00ef_4444),
    entry("border-gray-200", ColorProperty::Border, 0x00e5_e7eb),
    entry("border-gray-700", ColorProperty::Border, 0x0037_4151),
];

/// Hex colors substituted for unparseable computed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFallback {
    /// Replacement `background-color`.
    pub background: Rgb,
    /// Replacement `color`.
    pub text: Rgb,
    /// Replacement `border-color`.
    pub border: Rgb,
}

impl ColorFallback {
    /// Fallbacks for light mode.
    pub const LIGHT: Self = Self {
        background: Rgb::from_u32(0x00ff_ffff),
        text: Rgb::from_u32(0x0011_1827),
        border: Rgb::from_u32(0x00e5_e7eb),
    };

    /// Fallbacks for dark mode.
    pub const DARK: Self = Self {
        background: Rgb::from_u32(0x001f_2937),
        text: Rgb::from_u32(0x00ff_ffff),
        border: Rgb::from_u32(0x0037_4151),
    };

    /// Fallbacks for the given mode.
    #[must_use]
    pub const fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Self::LIGHT,
            ColorMode::Dark => Self::DARK,
        }
    }

    /// Fallback for one property.
    #[must_use]
    pub const fn get(self, property: ColorProperty) -> Rgb {
        match property {
            ColorProperty::Background => self.background,
            ColorProperty::Text => self.text,
            ColorProperty::Border => self.border,
        }
    }
}

/// What the exclusion predicate needs to know about an element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementInfo<'a> {
    /// Tag name as reported by the DOM (any case).
    pub tag_name: &'a str,
    /// Space-separated class list.
    pub class_name: &'a str,
    /// Whether the element carries [`IGNORE_ATTRIBUTE`].
    pub ignore_attribute: bool,
}

/// Computed color values of one element in the capture clone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputedColors<'a> {
    /// Computed `background-color`.
    pub background: &'a str,
    /// Computed `color`.
    pub text: &'a str,
    /// Computed `border-color`.
    pub border: &'a str,
}

impl ComputedColors<'_> {
    /// Computed value of one property.
    #[must_use]
    pub const fn get(&self, property: ColorProperty) -> &str {
        match property {
            ColorProperty::Background => self.background,
            ColorProperty::Text => self.text,
            ColorProperty::Border => self.border,
        }
    }
}

/// Sanitize rules for one export, keyed by color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeRules {
    mode: ColorMode,
    fallback: ColorFallback,
}

impl SanitizeRules {
    /// Rules for the given mode.
    #[must_use]
    pub const fn for_mode(mode: ColorMode) -> Self {
        Self {
            mode,
            fallback: ColorFallback::for_mode(mode),
        }
    }

    /// Mode the rules were built for.
    #[must_use]
    pub const fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Fallback colors in effect.
    #[must_use]
    pub const fn fallback(&self) -> ColorFallback {
        self.fallback
    }

    /// CSS text of the temporary style layer.
    #[must_use]
    pub fn style_layer_css(&self) -> String {
        let mut css = String::new();

        let _ = writeln!(
            css,
            "* {{ color-scheme: none !important; transition: none !important; animation: none !important; }}"
        );

        let hidden: Vec<String> = EXCLUDED_CLASSES
            .iter()
            .map(|class| format!(".{class}"))
            .chain(std::iter::once(format!("[{IGNORE_ATTRIBUTE}]")))
            .collect();
        let _ = writeln!(
            css,
            "{} {{ visibility: hidden !important; }}",
            hidden.join(", ")
        );

        let _ = writeln!(
            css,
            "[class*=\"blur\"], [class*=\"shadow\"], [class*=\"backdrop\"] {{ filter: none !important; backdrop-filter: none !important; box-shadow: none !important; }}"
        );

        for PaletteEntry {
            class,
            property,
            color,
        } in PALETTE
        {
            let _ = writeln!(
                css,
                ".{class} {{ {}: {color} !important; }}",
                property.css_name()
            );
        }

        css
    }

    /// The element-exclusion predicate handed to the capability.
    ///
    /// Excludes spinners, `<style>` elements and anything carrying
    /// [`IGNORE_ATTRIBUTE`].
    #[must_use]
    pub fn excludes(&self, element: &ElementInfo<'_>) -> bool {
        element.ignore_attribute
            || element.tag_name.eq_ignore_ascii_case("style")
            || element
                .class_name
                .split_ascii_whitespace()
                .any(|class| EXCLUDED_CLASSES.contains(&class))
    }

    /// Inline overrides for one element of the capture clone.
    ///
    /// Returns the properties whose computed value uses an unsupported
    /// color function, each paired with this mode's hex fallback.
    #[must_use]
    pub fn clone_overrides(&self, computed: &ComputedColors<'_>) -> Vec<(ColorProperty, Rgb)> {
        ColorProperty::ALL
            .into_iter()
            .filter(|&property| uses_unsupported_color_function(computed.get(property)))
            .map(|property| (property, self.fallback.get(property)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_layer_pins_every_palette_class() {
        for mode in [ColorMode::Light, ColorMode::Dark] {
            let css = SanitizeRules::for_mode(mode).style_layer_css();
            for entry in PALETTE {
                let rule = format!(
                    ".{} {{ {}: {} !important; }}",
                    entry.class,
                    entry.property.css_name(),
                    entry.color
                );
                assert!(css.contains(&rule), "missing rule {rule:?} in {mode:?}");
            }
        }
    }

    #[test]
    fn style_layer_hides_spinners_and_opted_out_elements() {
        let css = SanitizeRules::for_mode(ColorMode::Light).style_layer_css();
        assert!(css.contains(".animate-spin, [data-ignore-pdf] { visibility: hidden !important; }"));
        assert!(css.contains("animation: none !important"));
        assert!(!css.contains("oklch"));
    }

    #[test]
    fn excludes_spinners_styles_and_ignored() {
        let rules = SanitizeRules::for_mode(ColorMode::Light);
        assert!(rules.excludes(&ElementInfo {
            tag_name: "DIV",
            class_name: "h-4 w-4 animate-spin",
            ignore_attribute: false,
        }));
        assert!(rules.excludes(&ElementInfo {
            tag_name: "STYLE",
            ..ElementInfo::default()
        }));
        assert!(rules.excludes(&ElementInfo {
            tag_name: "SECTION",
            ignore_attribute: true,
            ..ElementInfo::default()
        }));
    }

    #[test]
    fn keeps_ordinary_elements() {
        let rules = SanitizeRules::for_mode(ColorMode::Dark);
        assert!(!rules.excludes(&ElementInfo {
            tag_name: "DIV",
            class_name: "bg-gray-800 rounded-lg animate-spin-slow",
            ignore_attribute: false,
        }));
    }

    #[test]
    fn clone_overrides_replace_only_unsupported_colors() {
        let rules = SanitizeRules::for_mode(ColorMode::Light);
        let computed = ComputedColors {
            background: "oklch(0.97 0 0)",
            text: "rgb(17, 24, 39)",
            border: "oklab(0.9 0 0)",
        };
        assert_eq!(
            rules.clone_overrides(&computed),
            vec![
                (ColorProperty::Background, Rgb::from_u32(0x00ff_ffff)),
                (ColorProperty::Border, Rgb::from_u32(0x00e5_e7eb)),
            ]
        );
    }

    #[test]
    fn clone_overrides_follow_mode() {
        let computed = ComputedColors {
            background: "oklch(0.2 0 0)",
            text: "oklch(0.98 0 0)",
            border: "rgb(55, 65, 81)",
        };
        let overrides = SanitizeRules::for_mode(ColorMode::Dark).clone_overrides(&computed);
        assert_eq!(
            overrides,
            vec![
                (ColorProperty::Background, Rgb::from_u32(0x001f_2937)),
                (ColorProperty::Text, Rgb::from_u32(0x00ff_ffff)),
            ]
        );
    }

    #[test]
    fn plain_colors_need_no_overrides() {
        let rules = SanitizeRules::for_mode(ColorMode::Light);
        assert!(rules.clone_overrides(&ComputedColors::default()).is_empty());
    }
}
