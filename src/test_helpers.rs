//! Shared test utilities for the simple-cover test suite.
//!
//! Synthetic rasters stand in for photographs so no fixture files are needed.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = SourceImage::from_rgba(gradient_image(1000, 800));
//! let assets = print_assets(&source);
//! ```

use image::{Rgba, RgbaImage};

use crate::compose::CoverAssets;
use crate::imaging::SourceImage;

// =========================================================================
// Synthetic rasters
// =========================================================================

/// A uniformly coloured image.
pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// A smooth diagonal gradient with some colour in every channel.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x + y) * 255 / (width + height).max(1)) as u8;
        Rgba([r, g, b, 255])
    })
}

// =========================================================================
// Asset bundles
// =========================================================================

/// Only the source photograph, enough for a digital cover.
pub fn digital_assets(source: &SourceImage) -> CoverAssets {
    CoverAssets {
        source: Some(source.clone()),
        ..CoverAssets::default()
    }
}

/// Source, logo and barcode: everything a print spread requires.
pub fn print_assets(source: &SourceImage) -> CoverAssets {
    CoverAssets {
        source: Some(source.clone()),
        front: None,
        logo: Some(SourceImage::from_rgba(solid_image(200, 100, [250, 250, 250, 255]))),
        barcode: Some(SourceImage::from_rgba(solid_image(300, 150, [255, 255, 255, 255]))),
    }
}
