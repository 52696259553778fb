//! Parameter types for raster operations.
//!
//! These structs describe *where* and *how coarsely* to operate, not how the
//! pixels are touched. They are shared by the pure geometry in
//! [`calculations`](super::calculations), the placeholder band in
//! [`placeholder`](super::placeholder) and the compositor.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`Rect`]: An axis-aligned pixel rectangle (panel, band, safe area).
//! - [`HashGrid`]: Placeholder-hash component counts along each axis.
//! - [`PixelRounding`]: How a layout variant turns fractional pixels into integers.

use crate::error::{CoverError, Result};
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fail with [`CoverError::InvalidGeometry`] unless the rectangle is
    /// non-empty and lies entirely inside a `width` x `height` raster.
    ///
    /// Never clamps: a band that does not fit is a layout bug upstream.
    pub fn ensure_within(&self, width: u32, height: u32) -> Result<()> {
        let fits = !self.is_empty()
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height);
        if fits {
            Ok(())
        } else {
            Err(CoverError::InvalidGeometry {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                bounds_width: width,
                bounds_height: height,
            })
        }
    }
}

/// Number of placeholder-hash components along each axis.
///
/// More components keep more of the band's structure; fewer give a flatter,
/// more frosted look. Both grids seen in production are kept as named
/// constants so each layout variant picks its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashGrid {
    pub x: u32,
    pub y: u32,
}

impl HashGrid {
    /// 2x2, used by the current digital cover and both print layouts.
    pub const COARSE: HashGrid = HashGrid { x: 2, y: 2 };
    /// 4x3, used by the first generation of digital covers.
    pub const FINE: HashGrid = HashGrid { x: 4, y: 3 };
}

/// Integer conversion applied to fractional pixel measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelRounding {
    /// `ceil`, for layouts that must never lose a pixel of coverage.
    Ceil,
    /// Drop the fraction, as assigning a float to a canvas size does.
    Truncate,
}

impl PixelRounding {
    pub fn apply(self, value: f64) -> u32 {
        let v = match self {
            PixelRounding::Ceil => value.ceil(),
            PixelRounding::Truncate => value.trunc(),
        };
        v.max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn rect_edges_and_center() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.center_x(), 60.0);
    }

    #[test]
    fn rect_inside_bounds_is_ok() {
        assert!(Rect::new(0, 608, 1000, 192).ensure_within(1000, 800).is_ok());
    }

    #[test]
    fn rect_touching_edge_is_ok_but_overflow_fails() {
        assert!(Rect::new(0, 0, 10, 10).ensure_within(10, 10).is_ok());
        let err = Rect::new(0, 1, 10, 10).ensure_within(10, 10).unwrap_err();
        assert!(matches!(err, CoverError::InvalidGeometry { y: 1, .. }));
    }

    #[test]
    fn empty_rect_is_invalid_geometry() {
        assert!(Rect::new(0, 0, 0, 10).ensure_within(10, 10).is_err());
    }

    #[test]
    fn rect_overflowing_u32_does_not_wrap() {
        assert!(Rect::new(u32::MAX, 0, 2, 1).ensure_within(10, 10).is_err());
    }

    #[test]
    fn rounding_modes() {
        assert_eq!(PixelRounding::Ceil.apply(191.2), 192);
        assert_eq!(PixelRounding::Truncate.apply(191.8), 191);
        assert_eq!(PixelRounding::Ceil.apply(-3.0), 0);
    }
}
