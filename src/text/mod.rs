//! Text: layout of the author/title band and glyph rendering.
//!
//! - **Typography**: Pure functions computing font sizes and anchor points (unit testable)
//! - **Backend**: [`TextRasterizer`] trait + [`GlyphRasterizer`]

pub mod backend;
pub mod glyph_backend;
pub mod typography;

pub use backend::{FontRole, TextRasterizer, TextSprite};
pub use glyph_backend::GlyphRasterizer;
pub use typography::{
    BandLayout, DrawInstruction, HorizontalAlign, Rotation, TitleLines, TypographyMode,
    VerticalAnchor, layout_band, split_title,
};
