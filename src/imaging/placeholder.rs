//! Frosted placeholder band.
//!
//! A band of the cover is replaced by its own low-frequency approximation:
//! the pixels are encoded into a [BlurHash](https://blurha.sh) with a tiny
//! component grid and decoded straight back at full size. The result is a
//! smooth wash of the band's dominant colours that keeps text readable over
//! a busy photograph.
//!
//! The decoded band doubles as a luminance probe. The RGB sum of its first
//! pixel (0–765) decides between dark and light text:
//!
//! ```text
//! sum > threshold (382)  →  black text
//! sum ≤ threshold        →  white text
//! ```

use super::params::{HashGrid, Rect};
use crate::error::{CoverError, Result};
use image::{Rgba, RgbaImage, imageops};
use serde::Serialize;
use tracing::{debug, instrument};

/// Colour chosen for text drawn over a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn rgba(self) -> Rgba<u8> {
        match self {
            TextColor::Black => Rgba([0, 0, 0, 255]),
            TextColor::White => Rgba([255, 255, 255, 255]),
        }
    }

    pub fn from_black_flag(black: bool) -> Self {
        if black {
            TextColor::Black
        } else {
            TextColor::White
        }
    }
}

/// Pick the text colour for a probed RGB sum.
pub fn classify_luminance(rgb_sum: u32, threshold: u32) -> TextColor {
    if rgb_sum > threshold {
        TextColor::Black
    } else {
        TextColor::White
    }
}

/// What [`frost_band`] did to the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrostedBand {
    pub rect: Rect,
    pub hash: String,
    /// RGB sum of the first decoded pixel.
    pub probe_sum: u32,
    pub text_color: TextColor,
}

fn check_grid(grid: HashGrid) -> Result<()> {
    let valid = 1..=9;
    if valid.contains(&grid.x) && valid.contains(&grid.y) {
        Ok(())
    } else {
        Err(CoverError::InvalidConfiguration(format!(
            "placeholder grid {}x{} is outside 1..=9 components per axis",
            grid.x, grid.y
        )))
    }
}

/// Encode the pixels under `rect` with the given component grid.
pub fn encode_region(canvas: &RgbaImage, rect: Rect, grid: HashGrid) -> Result<String> {
    check_grid(grid)?;
    rect.ensure_within(canvas.width(), canvas.height())?;
    let block = imageops::crop_imm(canvas, rect.x, rect.y, rect.width, rect.height).to_image();
    blurhash::encode(grid.x, grid.y, rect.width, rect.height, block.as_raw())
        .map_err(|e| CoverError::Placeholder(format!("{e:?}")))
}

/// Decode a hash into an RGBA buffer of the requested size.
pub fn decode_hash(hash: &str, width: u32, height: u32) -> Result<RgbaImage> {
    let pixels = blurhash::decode(hash, width, height, 1.0)
        .map_err(|e| CoverError::Placeholder(format!("{e:?}")))?;
    RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        CoverError::Placeholder(format!(
            "decoded buffer does not match a {width}x{height} RGBA image"
        ))
    })
}

/// Replace the pixels under `rect` with their hash reconstruction.
///
/// Fails with [`CoverError::InvalidGeometry`] when `rect` is not fully inside
/// the canvas; the canvas is left untouched in that case.
#[instrument(skip(canvas), fields(canvas_w = canvas.width(), canvas_h = canvas.height()))]
pub fn frost_band(
    canvas: &mut RgbaImage,
    rect: Rect,
    grid: HashGrid,
    luminance_threshold: u32,
) -> Result<FrostedBand> {
    let hash = encode_region(canvas, rect, grid)?;
    let decoded = decode_hash(&hash, rect.width, rect.height)?;
    imageops::replace(canvas, &decoded, rect.x as i64, rect.y as i64);

    let first = decoded.get_pixel(0, 0);
    let probe_sum = first[0] as u32 + first[1] as u32 + first[2] as u32;
    let text_color = classify_luminance(probe_sum, luminance_threshold);
    debug!(%hash, probe_sum, ?text_color, "Band frosted");

    Ok(FrostedBand {
        rect,
        hash,
        probe_sum,
        text_color,
    })
}
