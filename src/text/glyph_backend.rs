//! Font rendering backend.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Parse font | `ab_glyph::FontVec::try_from_vec` |
//! | Point size to scale | `ab_glyph::Font::pt_to_px_scale` (96 dpi) |
//! | Measure run | glyph advances and kerning, as `imageproc` lays them out |
//! | Coverage mask | `imageproc::drawing::draw_text_mut` on a `GrayImage` |
//!
//! Glyphs are drawn as a coverage mask first and then tinted, so anti-aliased
//! edges keep the text colour instead of fading towards the transparent
//! background.

use super::backend::{FontRole, TextRasterizer, TextSprite};
use crate::config::FontsConfig;
use crate::error::{CoverError, Result};
use ab_glyph::{Font, FontVec, GlyphId, PxScale, Rect, ScaleFont, point};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Renders text with one loaded font per [`FontRole`].
pub struct GlyphRasterizer {
    author: FontVec,
    title: FontVec,
    spine: FontVec,
}

impl GlyphRasterizer {
    /// Load the three fonts named in the configuration.
    pub fn from_config(fonts: &FontsConfig) -> Result<Self> {
        Ok(Self {
            author: load_font(&fonts.author)?,
            title: load_font(&fonts.title)?,
            spine: load_font(&fonts.spine)?,
        })
    }

    /// Build from raw font data, e.g. fonts embedded with `include_bytes!`.
    pub fn from_bytes(author: Vec<u8>, title: Vec<u8>, spine: Vec<u8>) -> Result<Self> {
        Ok(Self {
            author: parse_font("author", author)?,
            title: parse_font("title", title)?,
            spine: parse_font("spine", spine)?,
        })
    }

    fn font(&self, role: FontRole) -> &FontVec {
        match role {
            FontRole::Author => &self.author,
            FontRole::Title => &self.title,
            FontRole::Spine => &self.spine,
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec> {
    let data = fs::read(path).map_err(|e| {
        CoverError::Font(format!("cannot read font {}: {e}", path.display()))
    })?;
    parse_font(&path.display().to_string(), data)
}

fn parse_font(name: &str, data: Vec<u8>) -> Result<FontVec> {
    FontVec::try_from_vec(data).map_err(|e| CoverError::Font(format!("{name}: {e}")))
}

/// Scale at which one em is `font_size_pt` CSS points (96 dpi).
fn pt_scale(font: &FontVec, font_size_pt: f32) -> Result<PxScale> {
    font.pt_to_px_scale(font_size_pt)
        .ok_or_else(|| CoverError::Font("font has no units-per-em".into()))
}

/// Pen advance and inked bounds of a run, with the pen starting at
/// `(0, ascent)`.
///
/// Glyphs are placed exactly as `imageproc::drawing::draw_text_mut` places
/// them, so `ink` covers every pixel that call paints.
struct RunMetrics {
    advance: f32,
    ink: Option<Rect>,
}

fn run_metrics(font: &FontVec, scale: PxScale, text: &str) -> RunMetrics {
    let scaled = font.as_scaled(scale);
    let mut advance = 0.0f32;
    let mut last: Option<GlyphId> = None;
    let mut ink: Option<Rect> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(advance, scaled.ascent()));
        advance += scaled.h_advance(id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            if let Some(last) = last {
                advance += scaled.kern(id, last);
            }
            last = Some(id);
            let bounds = outlined.px_bounds();
            ink = Some(match ink {
                None => bounds,
                Some(r) => Rect {
                    min: point(r.min.x.min(bounds.min.x), r.min.y.min(bounds.min.y)),
                    max: point(r.max.x.max(bounds.max.x), r.max.y.max(bounds.max.y)),
                },
            });
        }
    }
    RunMetrics { advance, ink }
}

fn check_size(font_size_pt: f32) -> Result<()> {
    if font_size_pt.is_finite() && font_size_pt > 0.0 {
        Ok(())
    } else {
        Err(CoverError::InvalidConfiguration(format!(
            "font size must be positive, got {font_size_pt} pt"
        )))
    }
}

impl TextRasterizer for GlyphRasterizer {
    /// The sprite spans the font's full ascent to descent, widened to any ink
    /// that overhangs the pen box (accents above the ascent, negative side
    /// bearings), so nothing drawn is cut off.
    fn rasterize(
        &self,
        role: FontRole,
        text: &str,
        font_size_pt: f32,
        color: Rgba<u8>,
    ) -> Result<TextSprite> {
        check_size(font_size_pt)?;
        let font = self.font(role);
        let scale = pt_scale(font, font_size_pt)?;
        let scaled = font.as_scaled(scale);
        let metrics = run_metrics(font, scale, text);

        let (ink_min_x, ink_min_y, ink_max_x, ink_max_y) = metrics
            .ink
            .map_or((0.0, 0.0, 0.0, 0.0), |r| (r.min.x, r.min.y, r.max.x, r.max.y));
        let left = (-ink_min_x.round()).max(0.0);
        let top = (-ink_min_y.round()).max(0.0);
        let width = metrics.advance.ceil().max(ink_max_x.ceil()) + left;
        let height = (scaled.ascent() - scaled.descent()).ceil().max(ink_max_y.ceil()) + top;
        let (width, height) = (width.max(0.0) as u32, height.max(0.0) as u32);
        let baseline = (scaled.ascent() + top).round().max(0.0) as u32;

        let mut mask = GrayImage::new(width, height);
        imageproc::drawing::draw_text_mut(
            &mut mask,
            Luma([255]),
            left as i32,
            top as i32,
            scale,
            font,
            text,
        );

        let Rgba([r, g, b, a]) = color;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let coverage = mask.get_pixel(x, y)[0] as u32;
            Rgba([r, g, b, (coverage * a as u32 / 255) as u8])
        });
        debug!(?role, font_size_pt, width, height, baseline, "Text rasterized");

        Ok(TextSprite { image, baseline })
    }

    /// Pen advance of the run, rounded up; no sprite is drawn.
    fn measure(&self, role: FontRole, text: &str, font_size_pt: f32) -> Result<u32> {
        check_size(font_size_pt)?;
        let font = self.font(role);
        let scale = pt_scale(font, font_size_pt)?;
        Ok(run_metrics(font, scale, text).advance.ceil().max(0.0) as u32)
    }
}
