//! Raster operations on in-memory RGBA buffers.
//!
//! Everything is pure Rust and statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` / `image::load_from_memory` |
//! | Scale into a panel | `image::imageops::resize` with `Lanczos3` |
//! | Back-panel blur | `image::imageops::fast_blur` |
//! | Solid fills (spine) | `imageproc::drawing::draw_filled_rect_mut` |
//! | Alpha compositing | `image::imageops::overlay` on a panel sub-image |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! Every painting helper takes the panel it belongs to and never writes
//! outside of it.

use super::params::{Quality, Rect};
use crate::error::{CoverError, Result};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageReader, Pixel, Rgba, RgbaImage};
use std::path::Path;
use tracing::{debug, instrument};

/// A decoded input raster. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Load and decode an image from disk, sniffing the format from content.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let decode_err = |reason: String| CoverError::Decode {
            what: path.display().to_string(),
            reason,
        };
        let pixels = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?
            .to_rgba8();
        debug!(
            width = pixels.width(),
            height = pixels.height(),
            "Image loaded"
        );
        Ok(Self { pixels })
    }

    /// Decode encoded bytes (any compiled-in format).
    pub fn from_bytes(what: &str, bytes: &[u8]) -> Result<Self> {
        let pixels = image::load_from_memory(bytes)
            .map_err(|e| CoverError::Decode {
                what: what.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        Ok(Self { pixels })
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Height that keeps `size`'s aspect ratio at the given width.
pub fn height_for_width(size: (u32, u32), width: f64) -> f64 {
    let (w, h) = size;
    if w == 0 {
        return 0.0;
    }
    h as f64 / w as f64 * width
}

/// Scale `src` to exactly `target` and composite it over the canvas there.
pub fn paint_scaled(canvas: &mut RgbaImage, src: &RgbaImage, target: Rect) {
    if target.is_empty() {
        return;
    }
    if src.dimensions() == (target.width, target.height) {
        imageops::overlay(canvas, src, target.x as i64, target.y as i64);
    } else {
        let scaled = imageops::resize(src, target.width, target.height, FilterType::Lanczos3);
        imageops::overlay(canvas, &scaled, target.x as i64, target.y as i64);
    }
}

/// Fill `rect` with an opaque colour.
pub fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }
    imageproc::drawing::draw_filled_rect_mut(
        canvas,
        imageproc::rect::Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        color,
    );
}

/// Heavy blur approximating a stack blur of the given radius.
///
/// A stack blur of radius `r` weights a triangle `2r + 1` pixels wide, whose
/// standard deviation is `(r + 1) / sqrt(6)`.
pub fn heavy_blur(src: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 {
        return src.clone();
    }
    let sigma = (radius as f32 + 1.0) / 6f32.sqrt();
    imageops::fast_blur(src, sigma)
}

/// Composite a translucent colour over every pixel.
///
/// Only the colour channels change; each pixel keeps its own alpha.
pub fn tint(image: &mut RgbaImage, overlay: Rgba<u8>) {
    for pixel in image.pixels_mut() {
        let alpha = pixel[3];
        pixel.blend(&overlay);
        pixel[3] = alpha;
    }
}

/// Composite `sprite` with its top-left at (`x`, `y`), clipped to `clip`.
pub fn paste_clipped(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i64, y: i64, clip: Rect) {
    let bounds = Rect::new(0, 0, canvas.width(), canvas.height());
    if clip.is_empty() || clip.ensure_within(bounds.width, bounds.height).is_err() {
        return;
    }
    let mut panel = imageops::crop(canvas, clip.x, clip.y, clip.width, clip.height);
    imageops::overlay(&mut *panel, sprite, x - clip.x as i64, y - clip.y as i64);
}

/// Encode the finished canvas as a baseline JPEG.
///
/// JPEG carries no alpha, so the canvas is flattened to RGB first.
pub fn encode_jpeg(canvas: &RgbaImage, quality: Quality) -> Result<Vec<u8>> {
    let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.value())
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CoverError::Encode(e.to_string()))?;
    Ok(bytes)
}
