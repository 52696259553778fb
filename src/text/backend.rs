//! Text rasterization backend trait and shared types.
//!
//! The [`TextRasterizer`] trait turns one run of text into a sprite: a tight
//! RGBA image of the glyphs plus the row of its baseline. Placement,
//! rotation and clipping are the compositor's job, so a backend never sees
//! the cover canvas.
//!
//! The production implementation is
//! [`GlyphRasterizer`](super::glyph_backend::GlyphRasterizer), which renders
//! TrueType/OpenType fonts with `ab_glyph`.

use crate::error::Result;
use image::{Rgba, RgbaImage};
use serde::Serialize;

/// Which font a run of text is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    /// Author line on the frosted band.
    Author,
    /// Title lines on the frosted band.
    Title,
    /// Author and title along the spine.
    Spine,
}

/// Rasterized text, unrotated, reading left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSprite {
    pub image: RgbaImage,
    /// Row of the alphabetic baseline, measured from the top of `image`.
    pub baseline: u32,
}

impl TextSprite {
    /// Advance width of the run.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Trait for text rasterization backends.
pub trait TextRasterizer {
    /// Render `text` in the font for `role` at `font_size_pt` points.
    ///
    /// Points follow the CSS convention: 1 pt = 4/3 px.
    fn rasterize(
        &self,
        role: FontRole,
        text: &str,
        font_size_pt: f32,
        color: Rgba<u8>,
    ) -> Result<TextSprite>;

    /// Advance width of `text` in pixels, without keeping the sprite.
    fn measure(&self, role: FontRole, text: &str, font_size_pt: f32) -> Result<u32> {
        if text.is_empty() {
            return Ok(0);
        }
        Ok(self
            .rasterize(role, text, font_size_pt, Rgba([255, 255, 255, 255]))?
            .width())
    }
}
