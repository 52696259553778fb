//! Pure calculation functions for cover geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Physical sizes are in centimetres, everything else in pixels. The pixel
//! space of a print spread is anchored on the width of the front-cover
//! photograph: one cover panel is exactly that many pixels wide, and every
//! other measurement (spine, bleed, total size) is scaled by the same
//! pixels-per-centimetre ratio.

use super::params::{PixelRounding, Rect};
use crate::error::{CoverError, Result};
use serde::{Deserialize, Serialize};

/// Pages per inch of spine for the fixed-format print layout.
const PAGES_PER_INCH: f64 = 444.0;
/// Cover board allowance added to the spine, in inches.
const SPINE_BOARD_INCHES: f64 = 0.06;
const CM_PER_INCH: f64 = 2.54;

/// Ratio of pixels to centimetres given a reference measured both ways.
///
/// A zero, negative or non-finite `reference_cm` is a configuration error;
/// it is never coerced to a default.
///
/// # Examples
/// ```
/// # use simple_cover::imaging::pixel_per_cm;
/// assert_eq!(pixel_per_cm(1000.0, 10.0).unwrap(), 100.0);
/// assert!(pixel_per_cm(1000.0, 0.0).is_err());
/// ```
pub fn pixel_per_cm(reference_px: f64, reference_cm: f64) -> Result<f64> {
    if !reference_cm.is_finite() || reference_cm <= 0.0 {
        return Err(CoverError::InvalidConfiguration(format!(
            "reference width must be a positive number of centimetres, got {reference_cm}"
        )));
    }
    if !reference_px.is_finite() || reference_px <= 0.0 {
        return Err(CoverError::InvalidConfiguration(format!(
            "reference width must be a positive number of pixels, got {reference_px}"
        )));
    }
    Ok(reference_px / reference_cm)
}

/// Convert a physical length to (fractional) pixels.
pub fn cm_to_pixels(value_cm: f64, pixel_per_cm: f64) -> f64 {
    value_cm * pixel_per_cm
}

/// Spine width of the fixed-format paperback for a given page count.
///
/// `(pages / 444 + 0.06)` inches, converted to centimetres.
pub fn spine_width_cm(page_count: u32) -> f64 {
    (page_count as f64 / PAGES_PER_INCH + SPINE_BOARD_INCHES) * CM_PER_INCH
}

/// Height of the bottom band for a panel of the given height.
pub fn band_height(panel_height: u32, fraction: f64) -> u32 {
    (panel_height as f64 * fraction).ceil() as u32
}

/// The bottom `fraction` of `area`, spanning its full width.
pub fn bottom_band(area: Rect, fraction: f64) -> Rect {
    let height = band_height(area.height, fraction).min(area.height);
    Rect::new(area.x, area.bottom() - height, area.width, height)
}

/// Physical measurements of a print cover, in centimetres.
///
/// `total_width_cm` spans back + spine + front including any bleed;
/// `edge_width_cm` is the bleed trimmed off every outer edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSpec {
    pub total_width_cm: f64,
    pub total_height_cm: f64,
    pub spine_width_cm: f64,
    pub edge_width_cm: f64,
}

impl PhysicalSpec {
    /// What a failed provider lookup hands back.
    pub fn zeroed() -> Self {
        Self {
            total_width_cm: 0.0,
            total_height_cm: 0.0,
            spine_width_cm: 0.0,
            edge_width_cm: 0.0,
        }
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }

    /// Width of one cover panel (back or front), bleed included.
    pub fn cover_width_cm(&self) -> f64 {
        (self.total_width_cm - self.spine_width_cm) / 2.0
    }

    /// Reject specs the layout cannot be computed from.
    pub fn validate(&self) -> Result<()> {
        if self.is_zeroed() {
            return Err(CoverError::InvalidConfiguration(
                "physical spec is all zeros; the dimension lookup did not produce a usable result"
                    .into(),
            ));
        }
        let fields = [
            ("total width", self.total_width_cm),
            ("total height", self.total_height_cm),
            ("spine width", self.spine_width_cm),
            ("edge width", self.edge_width_cm),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoverError::InvalidConfiguration(format!(
                "{name} is not a finite number: {value}"
            )));
        }
        if self.total_width_cm <= 0.0 || self.total_height_cm <= 0.0 {
            return Err(CoverError::InvalidConfiguration(format!(
                "cover must have a positive size, got {} x {} cm",
                self.total_width_cm, self.total_height_cm
            )));
        }
        if self.spine_width_cm <= 0.0 || self.spine_width_cm >= self.total_width_cm {
            return Err(CoverError::InvalidConfiguration(format!(
                "spine width {} cm must be positive and narrower than the total width {} cm",
                self.spine_width_cm, self.total_width_cm
            )));
        }
        if self.edge_width_cm < 0.0 {
            return Err(CoverError::InvalidConfiguration(format!(
                "edge width must not be negative, got {} cm",
                self.edge_width_cm
            )));
        }
        if self.edge_width_cm * 2.0 >= self.total_height_cm
            || self.edge_width_cm >= self.cover_width_cm()
        {
            return Err(CoverError::InvalidConfiguration(format!(
                "edge width {} cm leaves no content area",
                self.edge_width_cm
            )));
        }
        Ok(())
    }
}

/// Pixel layout of a print spread derived from a [`PhysicalSpec`].
///
/// Fractional values are kept as computed; integer panel boundaries are
/// produced on demand with the variant's [`PixelRounding`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelGeometry {
    pub pixel_per_cm: f64,
    pub cover_width: f64,
    pub spine_width: f64,
    pub total_width: f64,
    pub total_height: f64,
    pub edge_width: f64,
    pub rounding: PixelRounding,
}

impl PixelGeometry {
    /// Anchor the spread on `cover_pixel_width`, the width of one cover panel.
    pub fn from_spec(
        spec: &PhysicalSpec,
        cover_pixel_width: u32,
        rounding: PixelRounding,
    ) -> Result<Self> {
        spec.validate()?;
        let ppcm = pixel_per_cm(cover_pixel_width as f64, spec.cover_width_cm())?;
        Ok(Self {
            pixel_per_cm: ppcm,
            cover_width: cover_pixel_width as f64,
            spine_width: cm_to_pixels(spec.spine_width_cm, ppcm),
            total_width: cm_to_pixels(spec.total_width_cm, ppcm),
            total_height: cm_to_pixels(spec.total_height_cm, ppcm),
            edge_width: cm_to_pixels(spec.edge_width_cm, ppcm),
            rounding,
        })
    }

    fn px(&self, value: f64) -> u32 {
        self.rounding.apply(value)
    }

    /// Integer size of the final raster.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.px(self.total_width), self.px(self.total_height))
    }

    pub fn back_panel(&self) -> Rect {
        Rect::new(0, 0, self.px(self.cover_width), self.px(self.total_height))
    }

    pub fn spine_panel(&self) -> Rect {
        let x0 = self.px(self.cover_width);
        let x1 = self.px(self.cover_width + self.spine_width);
        Rect::new(x0, 0, x1 - x0, self.px(self.total_height))
    }

    pub fn front_panel(&self) -> Rect {
        let x0 = self.px(self.cover_width + self.spine_width);
        let (width, height) = self.canvas_size();
        Rect::new(x0, 0, width.saturating_sub(x0), height)
    }

    /// Horizontal centre line of the spine.
    pub fn spine_center_x(&self) -> f64 {
        self.cover_width + self.spine_width / 2.0
    }

    /// Part of the back panel that survives trimming: the bleed is removed
    /// from the outer, top and bottom edges, not from the spine side.
    pub fn back_safe_area(&self) -> Rect {
        let panel = self.back_panel();
        let edge = self.px(self.edge_width);
        Rect::new(
            edge,
            edge,
            panel.width.saturating_sub(edge),
            panel.height.saturating_sub(edge * 2),
        )
    }

    /// Mirror of [`back_safe_area`](Self::back_safe_area) for the front panel.
    pub fn front_safe_area(&self) -> Rect {
        let panel = self.front_panel();
        let edge = self.px(self.edge_width);
        Rect::new(
            panel.x,
            edge,
            panel.width.saturating_sub(edge),
            panel.height.saturating_sub(edge * 2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_spec(pages: u32) -> PhysicalSpec {
        PhysicalSpec {
            total_width_cm: 30.158,
            total_height_cm: 22.225,
            spine_width_cm: spine_width_cm(pages),
            edge_width_cm: 0.0,
        }
    }

    // =========================================================================
    // Unit conversion
    // =========================================================================

    #[test]
    fn pixel_per_cm_simple_ratio() {
        assert_eq!(pixel_per_cm(1500.0, 15.0).unwrap(), 100.0);
    }

    #[test]
    fn pixel_per_cm_zero_reference_is_invalid_configuration() {
        let err = pixel_per_cm(1000.0, 0.0).unwrap_err();
        assert!(matches!(err, CoverError::InvalidConfiguration(_)));
    }

    #[test]
    fn pixel_per_cm_rejects_negative_and_nan() {
        assert!(pixel_per_cm(1000.0, -2.0).is_err());
        assert!(pixel_per_cm(1000.0, f64::NAN).is_err());
        assert!(pixel_per_cm(0.0, 10.0).is_err());
    }

    #[test]
    fn ratio_times_cover_cm_gives_back_cover_pixels() {
        for pages in [24, 120, 300, 742] {
            let spec = fixed_spec(pages);
            let ppcm = pixel_per_cm(1234.0, spec.cover_width_cm()).unwrap();
            assert!((ppcm * spec.cover_width_cm() - 1234.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cm_to_pixels_scales_linearly() {
        assert_eq!(cm_to_pixels(2.5, 40.0), 100.0);
        assert_eq!(cm_to_pixels(0.0, 40.0), 0.0);
    }

    #[test]
    fn spine_for_300_pages() {
        // (300/444 + 0.06) * 2.54
        assert!((spine_width_cm(300) - 1.8686).abs() < 1e-3);
    }

    #[test]
    fn spine_grows_with_page_count() {
        assert!(spine_width_cm(400) > spine_width_cm(399));
        assert!((spine_width_cm(0) - 0.1524).abs() < 1e-9);
    }

    // =========================================================================
    // Bands
    // =========================================================================

    #[test]
    fn band_height_rounds_up() {
        // 800 * 0.24 = 192 exactly
        assert_eq!(band_height(800, 0.24), 192);
        // 801 * 0.24 = 192.24
        assert_eq!(band_height(801, 0.24), 193);
    }

    #[test]
    fn bottom_band_sits_on_area_bottom() {
        let band = bottom_band(Rect::new(10, 20, 300, 400), 0.25);
        assert_eq!(band, Rect::new(10, 320, 300, 100));
    }

    // =========================================================================
    // PhysicalSpec validation
    // =========================================================================

    #[test]
    fn zeroed_spec_is_rejected() {
        let err = PhysicalSpec::zeroed().validate().unwrap_err();
        assert!(matches!(err, CoverError::InvalidConfiguration(m) if m.contains("all zeros")));
    }

    #[test]
    fn spine_wider_than_cover_is_rejected() {
        let spec = PhysicalSpec {
            spine_width_cm: 31.0,
            ..fixed_spec(100)
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn negative_edge_is_rejected() {
        let spec = PhysicalSpec {
            edge_width_cm: -0.1,
            ..fixed_spec(100)
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn fixed_spec_is_valid() {
        assert!(fixed_spec(300).validate().is_ok());
    }

    // =========================================================================
    // PixelGeometry
    // =========================================================================

    #[test]
    fn geometry_spine_matches_ratio_for_300_pages() {
        let spec = fixed_spec(300);
        let geo = PixelGeometry::from_spec(&spec, 1000, PixelRounding::Truncate).unwrap();
        let expected = geo.pixel_per_cm * 1.8686;
        assert!((geo.spine_width - expected).abs() < 0.5);
        // total = back + spine + front
        assert!((geo.total_width - (2.0 * 1000.0 + geo.spine_width)).abs() < 1e-6);
    }

    #[test]
    fn geometry_panels_tile_the_canvas() {
        let geo =
            PixelGeometry::from_spec(&fixed_spec(300), 1000, PixelRounding::Truncate).unwrap();
        let (w, h) = geo.canvas_size();
        let back = geo.back_panel();
        let spine = geo.spine_panel();
        let front = geo.front_panel();
        assert_eq!(back.x, 0);
        assert_eq!(back.right(), spine.x);
        assert_eq!(spine.right(), front.x);
        assert_eq!(front.right(), w);
        assert_eq!(back.height, h);
        assert_eq!(back.width, 1000);
    }

    #[test]
    fn truncate_and_ceil_differ_on_fractional_spread() {
        let spec = fixed_spec(300);
        let t = PixelGeometry::from_spec(&spec, 1000, PixelRounding::Truncate).unwrap();
        let c = PixelGeometry::from_spec(&spec, 1000, PixelRounding::Ceil).unwrap();
        assert_eq!(c.canvas_size().0, t.canvas_size().0 + 1);
    }

    #[test]
    fn safe_area_excludes_bleed() {
        let spec = PhysicalSpec {
            total_width_cm: 26.0,
            total_height_cm: 19.5,
            spine_width_cm: 2.0,
            edge_width_cm: 0.25,
        };
        // cover = 12 cm at 100 px/cm
        let geo = PixelGeometry::from_spec(&spec, 1200, PixelRounding::Ceil).unwrap();
        assert_eq!(geo.canvas_size(), (2600, 1950));
        assert_eq!(geo.back_safe_area(), Rect::new(25, 25, 1175, 1900));
        assert_eq!(geo.front_safe_area(), Rect::new(1400, 25, 1175, 1900));
        assert_eq!(geo.spine_center_x(), 1300.0);
    }

    #[test]
    fn geometry_rejects_zeroed_spec() {
        let err = PixelGeometry::from_spec(&PhysicalSpec::zeroed(), 1000, PixelRounding::Ceil)
            .unwrap_err();
        assert!(matches!(err, CoverError::InvalidConfiguration(_)));
    }
}
