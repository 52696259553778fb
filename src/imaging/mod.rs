//! Image processing for covers: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Scale into panel** | Lanczos3 resize + `overlay` |
//! | **Back-panel blur** | `image::imageops::fast_blur` |
//! | **Frosted band** | `blurhash` encode → decode roundtrip |
//! | **Encode** | JPEG via `image::codecs::jpeg` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for unit conversion and spread geometry (unit testable)
//! - **Parameters**: Data structures describing rectangles, grids and rounding
//! - **Placeholder**: The frosted band and its luminance probe
//! - **Raster**: Pixel operations on owned RGBA buffers

mod calculations;
mod params;
pub mod placeholder;
pub mod raster;

pub use calculations::{
    PhysicalSpec, PixelGeometry, band_height, bottom_band, cm_to_pixels, pixel_per_cm,
    spine_width_cm,
};
pub use params::{HashGrid, PixelRounding, Quality, Rect};
pub use placeholder::{FrostedBand, TextColor, classify_luminance, frost_band};
pub use raster::SourceImage;
