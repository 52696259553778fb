//! Spine layout of a print spread.
//!
//! The spine carries, top to bottom: the publisher logo, the title and the
//! author. Both text runs are rotated 270° so they read bottom to top when
//! the book lies face up.
//!
//! ```text
//!  ┌──────┐  ─┬─ outer
//!  │ LOGO │   │
//!  │      │  ─┴─ logo bottom
//!  │  T   │
//!  │  I   │  ← title, centred between logo bottom and author top
//!  │  T   │
//!  │      │  ─┬─ author top = height - outer - author width
//!  │  A   │   │
//!  │  U   │   │
//!  └──────┘  ─┴─ height - outer   ← author anchor
//! ```

use crate::config::PrintConfig;
use crate::error::Result;
use crate::imaging::{PixelGeometry, Rect, TextColor, raster::height_for_width};
use crate::text::{
    DrawInstruction, FontRole, HorizontalAlign, Rotation, TextRasterizer, VerticalAnchor,
};
use serde::Serialize;

/// Everything placed on the spine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpineLayout {
    /// Margin kept free at the top and bottom, in pixels.
    pub outer_distance: f64,
    pub logo: Rect,
    /// Author then title; empty when spine text is disabled.
    pub instructions: Vec<DrawInstruction>,
}

/// Top and bottom margin of the spine: a fixed pixel part plus a physical part.
pub fn outer_distance(geometry: &PixelGeometry, config: &PrintConfig) -> f64 {
    config.spine_outer_distance_px + config.spine_outer_distance_cm * geometry.pixel_per_cm
}

/// Font size proportional to the spine width, capped.
fn spine_font_size(spine_width: f64, ratio: f64, max: f64) -> f32 {
    (spine_width * ratio).min(max) as f32
}

/// Vertical centre for the title between the logo and the author run.
pub fn title_center_y(height: f64, outer: f64, logo_height: f64, author_width: f64) -> f64 {
    let top = logo_height + outer;
    let bottom = author_width + outer;
    (height - top - bottom) / 2.0 + top
}

fn spine_text(
    role_text: &str,
    x: f64,
    y: f64,
    font_size: f32,
    align: HorizontalAlign,
) -> DrawInstruction {
    DrawInstruction {
        role: FontRole::Spine,
        text: role_text.to_string(),
        x,
        y,
        font_size,
        color: Some(TextColor::White),
        align,
        anchor: VerticalAnchor::Middle,
        rotation: Rotation::Deg270,
    }
}

/// Lay out logo, author and title on the spine.
///
/// The author run is measured with `rasterizer` because the title is centred
/// in whatever space the author leaves.
pub fn layout_spine(
    geometry: &PixelGeometry,
    logo_size: (u32, u32),
    author: &str,
    title: &str,
    config: &PrintConfig,
    rasterizer: &dyn TextRasterizer,
) -> Result<SpineLayout> {
    let (_, canvas_height) = geometry.canvas_size();
    let height = canvas_height as f64;
    let spine_width = geometry.spine_width;
    let center_x = geometry.spine_center_x();
    let outer = outer_distance(geometry, config);

    let logo_width = (spine_width * config.logo_width_ratio).min(config.logo_max_width_px);
    let logo_height = height_for_width(logo_size, logo_width);
    let logo = Rect::new(
        (center_x - logo_width / 2.0).round().max(0.0) as u32,
        outer.round() as u32,
        logo_width.round() as u32,
        logo_height.round() as u32,
    );

    let mut instructions = Vec::new();
    if config.spine_text {
        let author_size = spine_font_size(
            spine_width,
            config.spine_author_ratio,
            config.spine_author_max_pt,
        );
        let title_size = spine_font_size(
            spine_width,
            config.spine_title_ratio,
            config.spine_title_max_pt,
        );
        let author_width = rasterizer.measure(FontRole::Spine, author, author_size)? as f64;
        instructions.push(spine_text(
            author,
            center_x,
            height - outer,
            author_size,
            HorizontalAlign::Left,
        ));
        instructions.push(spine_text(
            title,
            center_x,
            title_center_y(height, outer, logo_height, author_width),
            title_size,
            HorizontalAlign::Center,
        ));
    }

    Ok(SpineLayout {
        outer_distance: outer,
        logo,
        instructions,
    })
}
