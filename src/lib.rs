//! # Simple Cover
//!
//! A book cover generator for e-books and paperbacks. A photograph becomes a
//! cover: the bottom of the image is frosted into a soft band carrying the
//! author and title, with text that stays readable whatever the picture.
//! Print covers are full spreads: a blurred back panel with the ISBN barcode,
//! a spine sized from the page count, and the sharp photograph on the front.
//!
//! # Architecture: Plan, Then Paint
//!
//! Every cover is produced in two stages:
//!
//! ```text
//! 1. Plan    request + asset sizes  →  CoverPlan   (pure geometry and typography)
//! 2. Paint   CoverPlan + pixels     →  ComposedCover (raster compositing)
//! ```
//!
//! Planning needs only the pixel dimensions of the assets and a way to measure
//! text, so every rectangle, font size and draw instruction can be checked in
//! unit tests without decoding or drawing anything. The `plan` command prints
//! the same structure the compositor paints from.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`variant`] | The layout variants: digital, digital-classic, print-simple, print-bod |
//! | [`provider`] | Physical cover measurements from a print-on-demand calculator |
//! | [`imaging`] | Geometry (cm ↔ px), the frosted band, raster primitives |
//! | [`text`] | Font sizing and placement, rasterizing text with real fonts |
//! | [`compose`] | Plans a cover and paints it onto a canvas |
//! | [`config`] | `cover.toml` loading, validation and stock defaults |
//! | [`naming`] | Output file names derived from the title |
//! | [`output`] | CLI output formatting for plans, covers and variants |
//! | [`error`] | The shared error type |
//!
//! # Design Decisions
//!
//! ## The Frosted Band
//!
//! The band is not a blur of the pixels underneath. The region is encoded as a
//! BlurHash with a handful of components and decoded back at full size, which
//! gives the same soft, colour-faithful wash regardless of image detail. The
//! hash's colour sum also decides whether the text is black or white.
//!
//! ## Text Behind a Trait
//!
//! Layout talks to [`text::TextRasterizer`], never to a font library directly.
//! The production backend uses `ab_glyph` through `imageproc`; tests use a
//! recording mock with predictable glyph widths, so placement assertions are
//! exact.
//!
//! ## Measurements From Outside
//!
//! Print-on-demand printers publish the exact spread for a binding, format and
//! page count. The `print-bod` variant asks them through
//! [`provider::DimensionService`] instead of guessing paper thickness; the
//! `print-simple` variant uses a fixed spread with a spine derived from the
//! page count.

pub mod compose;
pub mod config;
pub mod error;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod provider;
pub mod text;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_helpers;
