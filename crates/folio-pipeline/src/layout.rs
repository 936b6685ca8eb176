//! Page layout and band slicing.
//!
//! The capture is scaled to the page width.  If the scaled image fits
//! the height left below the header it is placed whole on one page;
//! otherwise the source bitmap is cut into horizontal bands, one per
//! page.  Bands are computed in source pixel rows so they partition the
//! capture exactly: no row is lost or drawn twice.

use image::RgbaImage;

use crate::config::PageGeometry;
use crate::types::Dimensions;

/// Errors raised while laying out pages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The capture has no pixels.
    #[error("capture is empty ({width}x{height})")]
    EmptyCapture {
        /// Capture width in pixels.
        width: u32,
        /// Capture height in pixels.
        height: u32,
    },

    /// The page leaves no room for the image.
    #[error("page {width}x{height} leaves no room for the image")]
    NoRoom {
        /// Page width in document units.
        width: f64,
        /// Page height in document units.
        height: f64,
    },
}

/// A run of source rows drawn on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// First source row (sum of all previous band heights).
    pub source_y: u32,
    /// Number of source rows.
    pub source_height: u32,
}

impl Band {
    /// Row just past the end of the band.
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.source_y + self.source_height
    }
}

/// One page's share of the capture and where it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// Source rows drawn on this page.
    pub band: Band,
    /// Left edge on the page.
    pub x: f64,
    /// Top edge on the page.
    pub y: f64,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
}

/// Slack allowed when counting pages, so a capture that fills its last
/// page up to float noise does not spill onto another one.
const PAGE_COUNT_TOLERANCE: f64 = 1e-9;

/// Partition `total_rows` into consecutive bands of `rows_per_page`
/// rows, where a page may hold a fractional number of rows.
///
/// Produces `ceil(total_rows / rows_per_page)` bands.  Band `k` ends at
/// row `floor((k + 1) * rows_per_page)` and the last band ends at
/// `total_rows`, so no band is taller than `ceil(rows_per_page)`.  A
/// `rows_per_page` below one is treated as one.
#[must_use]
pub fn paginate(total_rows: u32, rows_per_page: f64) -> Vec<Band> {
    let rows_per_page = if rows_per_page >= 1.0 {
        rows_per_page
    } else {
        1.0
    };
    let pages = (f64::from(total_rows) / rows_per_page - PAGE_COUNT_TOLERANCE)
        .ceil()
        .clamp(0.0, f64::from(total_rows));
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pages = pages as u32;

    let mut bands = Vec::with_capacity(pages as usize);
    let mut source_y = 0;
    for page in 1..=pages {
        let end = if page == pages {
            total_rows
        } else {
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let end = (f64::from(page) * rows_per_page).floor() as u32;
            end.clamp(source_y + 1, total_rows)
        };
        bands.push(Band {
            source_y,
            source_height: end - source_y,
        });
        source_y = end;
    }
    bands
}

/// Lay out a capture on pages of the given size.
///
/// The image spans the full page width and starts `geometry.image_top`
/// below the top edge on every page.
///
/// # Errors
///
/// Returns [`LayoutError::EmptyCapture`] for a capture without pixels
/// and [`LayoutError::NoRoom`] if the page is too small for any image.
pub fn plan_pages(
    capture: Dimensions,
    page_width: f64,
    page_height: f64,
    geometry: &PageGeometry,
) -> Result<Vec<PageSlice>, LayoutError> {
    if capture.width == 0 || capture.height == 0 {
        return Err(LayoutError::EmptyCapture {
            width: capture.width,
            height: capture.height,
        });
    }
    let available = geometry.available_height(page_height);
    if !(page_width > 0.0 && available > 0.0) {
        return Err(LayoutError::NoRoom {
            width: page_width,
            height: page_height,
        });
    }

    let px_per_unit = f64::from(capture.width) / page_width;
    let image_height = f64::from(capture.height) / px_per_unit;

    let slice = |band: Band| PageSlice {
        band,
        x: 0.0,
        y: geometry.image_top,
        width: page_width,
        height: f64::from(band.source_height) / px_per_unit,
    };

    if image_height <= available {
        return Ok(vec![slice(Band {
            source_y: 0,
            source_height: capture.height,
        })]);
    }

    Ok(paginate(capture.height, available * px_per_unit)
        .into_iter()
        .map(slice)
        .collect())
}

/// Copy the rows of one band out of the capture.
#[must_use]
pub fn band_image(image: &RgbaImage, band: Band) -> RgbaImage {
    image::imageops::crop_imm(image, 0, band.source_y, image.width(), band.source_height).to_image()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn assert_partition(bands: &[Band], total: u32, max_rows: u32) {
        let mut next = 0;
        for band in bands {
            assert_eq!(band.source_y, next, "gap or overlap at {total}");
            assert!(band.source_height > 0);
            assert!(band.source_height <= max_rows);
            next = band.end();
        }
        assert_eq!(next, total);
    }

    #[test]
    fn paginate_partitions_exactly() {
        for total in 0..200u32 {
            for per_page in 1..40u32 {
                let bands = paginate(total, f64::from(per_page));
                assert_eq!(bands.len() as u32, total.div_ceil(per_page));
                assert_partition(&bands, total, per_page);
            }
        }
    }

    #[test]
    fn paginate_fractional_rows_does_not_add_pages() {
        // 5.5 rows per page: 11 rows fill exactly two pages.
        let bands = paginate(11, 5.5);
        assert_eq!(
            bands,
            vec![
                Band {
                    source_y: 0,
                    source_height: 5
                },
                Band {
                    source_y: 5,
                    source_height: 6
                },
            ]
        );
    }

    #[test]
    fn paginate_less_than_one_row_is_one() {
        assert_eq!(paginate(3, 0.0).len(), 3);
        assert_eq!(paginate(3, 0.4).len(), 3);
    }

    #[test]
    fn page_count_is_ceil_of_scaled_height() {
        let geometry = PageGeometry::A4;
        let available = geometry.available_height(297.0);
        for width in (1..=2100u32).step_by(37).chain([5, 420, 1260, 2000]) {
            for height in (1..=9000u32).step_by(113).chain([11, 1200, 7057]) {
                let slices = plan_pages(dims(width, height), 210.0, 297.0, &geometry).unwrap();
                let scaled = f64::from(height) * 210.0 / f64::from(width);
                let expected = (scaled / available - 1e-9).ceil().max(1.0) as usize;
                assert_eq!(slices.len(), expected, "{width}x{height} ({scaled} mm)");

                let rows_per_page = available * f64::from(width) / 210.0;
                let bands: Vec<Band> = slices.iter().map(|s| s.band).collect();
                assert_partition(&bands, height, rows_per_page.ceil().max(1.0) as u32);
            }
        }
    }

    #[test]
    fn uneven_pixel_density_keeps_page_count() {
        // 2000 px over 210 mm: 7057 rows scale to ~741 mm, three pages of 247 mm.
        let slices = plan_pages(dims(2000, 7057), 210.0, 297.0, &PageGeometry::A4).unwrap();
        assert_eq!(slices.len(), 3);
        assert!(slices[2].band.source_height > 1);
        for slice in &slices {
            assert!(slice.height <= 247.0 + 210.0 / 2000.0);
        }

        // 5 px wide: 11 rows scale to 462 mm, two pages.
        let slices = plan_pages(dims(5, 11), 210.0, 297.0, &PageGeometry::A4).unwrap();
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn fitting_capture_is_one_page() {
        // 1260 px wide at 6 px/mm: 1140 px tall -> 190 mm, within 247 mm.
        let slices = plan_pages(dims(1260, 1140), 210.0, 297.0, &PageGeometry::A4).unwrap();
        assert_eq!(slices.len(), 1);
        let only = slices[0];
        assert_eq!(
            only.band,
            Band {
                source_y: 0,
                source_height: 1140
            }
        );
        assert!((only.height - 190.0).abs() < 1e-9);
        assert!((only.width - 210.0).abs() < 1e-9);
        assert!((only.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn tall_capture_spans_three_pages() {
        // 420 px wide at 2 px/mm: 1200 px tall -> 600 mm; ceil(600 / 247) = 3.
        let slices = plan_pages(dims(420, 1200), 210.0, 297.0, &PageGeometry::A4).unwrap();
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].band.source_height, 494);
        assert_eq!(slices[1].band.source_y, 494);
        assert_eq!(slices[2].band.source_height, 1200 - 2 * 494);
        for slice in &slices {
            assert!(slice.height <= 247.0 + 1e-9);
            assert!((slice.y - 40.0).abs() < 1e-9);
        }
        let total: f64 = slices.iter().map(|s| s.height).sum();
        assert!((total - 600.0).abs() < 1e-9);
    }

    #[test]
    fn exact_fit_stays_on_one_page() {
        // 210 px wide at 1 px/mm, exactly 247 rows.
        let slices = plan_pages(dims(210, 247), 210.0, 297.0, &PageGeometry::A4).unwrap();
        assert_eq!(slices.len(), 1);
    }

    #[test]
    fn empty_capture_rejected() {
        assert!(matches!(
            plan_pages(dims(0, 10), 210.0, 297.0, &PageGeometry::A4),
            Err(LayoutError::EmptyCapture { .. })
        ));
    }

    #[test]
    fn page_without_room_rejected() {
        assert!(matches!(
            plan_pages(dims(10, 10), 210.0, 45.0, &PageGeometry::A4),
            Err(LayoutError::NoRoom { .. })
        ));
    }

    #[test]
    fn bands_reassemble_the_source() {
        let source = RgbaImage::from_fn(7, 53, |x, y| {
            image::Rgba([x as u8, y as u8, (x * y % 251) as u8, 255])
        });
        let mut rebuilt = RgbaImage::new(7, 53);
        for band in paginate(source.height(), 10.0) {
            let part = band_image(&source, band);
            assert_eq!(part.height(), band.source_height);
            image::imageops::replace(&mut rebuilt, &part, 0, i64::from(band.source_y));
        }
        assert_eq!(rebuilt.as_raw(), source.as_raw());
    }
}
