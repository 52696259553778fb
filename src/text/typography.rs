//! Typographic layout of the frosted band.
//!
//! Everything here is pure: given the band rectangle, the height the font
//! sizes are scaled to, and the text, it produces [`DrawInstruction`]s. No
//! font is loaded and no pixel is touched.
//!
//! ## Font sizes
//!
//! Base sizes were tuned on a cover 2100 px tall and scale linearly with the
//! output height:
//!
//! ```text
//! size = ceil(base / 2100 × height)
//! ```
//!
//! In auto mode the title base shrinks by 4 pt for every character of the
//! first line beyond 15, and a two-line title is multiplied by 0.8 (rounded
//! up) before scaling. In override mode the caller's size is scaled the same
//! way.
//!
//! ## Vertical placement
//!
//! All positions are alphabetic baselines, centred on the panel midpoint.
//! With `S` the band start, `B` the band height and `E` the band end:
//!
//! ```text
//! author   = S + author/2 + B/4          (B/6 with a second title line)
//! one line = S + title/2  + B/2 + B/7
//! line 1   = author + title/2 + R/3.3    where R = E - author
//! line 2   = author + title/2 + R/2 + R/5
//! ```

use super::backend::FontRole;
use crate::config::TypographyConfig;
use crate::error::{CoverError, Result};
use crate::imaging::{Rect, TextColor};
use serde::Serialize;

/// A title split at its first line break. Further lines are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleLines {
    pub first: String,
    pub second: Option<String>,
}

impl TitleLines {
    /// Length of the first line in characters, the measure the shrink rule uses.
    pub fn first_len(&self) -> usize {
        self.first.chars().count()
    }

    pub fn has_second(&self) -> bool {
        self.second.is_some()
    }
}

/// Split a raw title on line breaks, keeping at most two lines.
///
/// An empty second line counts as no second line.
pub fn split_title(raw: &str) -> TitleLines {
    let mut lines = raw.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let first = lines.next().unwrap_or_default().to_string();
    let second = lines
        .next()
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    TitleLines { first, second }
}

/// How band text is sized and coloured.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TypographyMode {
    /// Sizes from the title length, colour from the band's luminance probe.
    #[default]
    Auto,
    /// Caller-chosen base title size and text colour.
    Override {
        font_size: Option<f64>,
        black_text: bool,
    },
}

impl TypographyMode {
    /// The colour this mode forces, if any.
    pub fn fixed_color(&self) -> Option<TextColor> {
        match self {
            TypographyMode::Auto => None,
            TypographyMode::Override { black_text, .. } => {
                Some(TextColor::from_black_flag(*black_text))
            }
        }
    }

    /// Fail unless the mode carries everything it needs.
    pub fn validate(&self) -> Result<()> {
        match self {
            TypographyMode::Auto => Ok(()),
            TypographyMode::Override { font_size: None, .. } => Err(
                CoverError::InvalidConfiguration(
                    "overridden typography requires an explicit title font size".into(),
                ),
            ),
            TypographyMode::Override {
                font_size: Some(size),
                ..
            } if !(size.is_finite() && *size > 0.0) => Err(CoverError::InvalidConfiguration(
                format!("title font size must be positive, got {size}"),
            )),
            TypographyMode::Override { .. } => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    /// `x` is the left end of the run.
    Left,
    /// `x` is the middle of the run.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    /// `y` is the alphabetic baseline.
    Baseline,
    /// `y` is the vertical middle of the run.
    Middle,
}

/// Rotation applied around the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    None,
    /// 270° clockwise: the run reads bottom to top.
    Deg270,
}

/// One run of text to draw, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawInstruction {
    pub role: FontRole,
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Points.
    pub font_size: f32,
    /// `None` defers to the band's luminance probe.
    pub color: Option<TextColor>,
    pub align: HorizontalAlign,
    pub anchor: VerticalAnchor,
    pub rotation: Rotation,
}

impl DrawInstruction {
    fn centered(role: FontRole, text: &str, x: f64, y: f64, font_size: u32) -> Self {
        Self {
            role,
            text: text.to_string(),
            x,
            y,
            font_size: font_size as f32,
            color: None,
            align: HorizontalAlign::Center,
            anchor: VerticalAnchor::Baseline,
            rotation: Rotation::None,
        }
    }
}

/// Where the band sits and what its font sizes are scaled to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandFrame {
    pub band: Rect,
    /// Height of the cover the band belongs to.
    pub reference_height: f64,
    /// Horizontal centre of the panel.
    pub center_x: f64,
}

/// Result of [`layout_band`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandLayout {
    pub author_font_size: u32,
    pub title_font_size: u32,
    /// Unscaled title size; in auto mode, what an override would start from.
    pub base_title_font_size: f64,
    pub instructions: Vec<DrawInstruction>,
}

/// Scale a size tuned for the reference height to `height`.
pub fn scale_font_size(base: f64, height: f64, config: &TypographyConfig) -> u32 {
    (base / config.reference_height * height).ceil().max(0.0) as u32
}

pub fn author_font_size(height: f64, config: &TypographyConfig) -> u32 {
    scale_font_size(config.author_base_font_size, height, config)
}

/// Unscaled auto-mode title size. Never below the configured minimum, so it
/// is non-increasing in the first line's length.
pub fn auto_title_base(lines: &TitleLines, config: &TypographyConfig) -> f64 {
    let mut size = config.title_base_font_size;
    let len = lines.first_len();
    if len > config.title_length_threshold {
        let excess = (len - config.title_length_threshold) as f64;
        size -= excess * config.title_shrink_per_char;
    }
    size = size.max(config.min_title_font_size);
    if lines.has_second() {
        size = (size * config.second_line_factor).ceil();
    }
    size
}

/// Unscaled title size for the mode.
pub fn title_base(
    lines: &TitleLines,
    mode: &TypographyMode,
    config: &TypographyConfig,
) -> Result<f64> {
    mode.validate()?;
    match mode {
        TypographyMode::Override {
            font_size: Some(size),
            ..
        } => Ok(*size),
        _ => Ok(auto_title_base(lines, config)),
    }
}

/// Lay out the author line and one or two title lines on the band.
pub fn layout_band(
    author: &str,
    lines: &TitleLines,
    frame: &BandFrame,
    mode: &TypographyMode,
    config: &TypographyConfig,
) -> Result<BandLayout> {
    let base_title = title_base(lines, mode, config)?;
    let author_size = author_font_size(frame.reference_height, config);
    let title_size = scale_font_size(base_title, frame.reference_height, config);

    let start = frame.band.y as f64;
    let height = frame.band.height as f64;
    let end = frame.band.bottom() as f64;
    let x = frame.center_x;

    let author_offset = if lines.has_second() { 6.0 } else { 4.0 };
    let author_y = start + author_size as f64 / 2.0 + height / author_offset;
    let half_title = title_size as f64 / 2.0;

    let mut instructions = vec![DrawInstruction::centered(
        FontRole::Author,
        author,
        x,
        author_y,
        author_size,
    )];
    match &lines.second {
        None => {
            let y = start + half_title + height / 2.0 + height / 7.0;
            instructions.push(DrawInstruction::centered(
                FontRole::Title,
                &lines.first,
                x,
                y,
                title_size,
            ));
        }
        Some(second) => {
            let rest = end - author_y;
            let y1 = author_y + half_title + rest / 3.3;
            let y2 = author_y + half_title + rest / 2.0 + rest / 5.0;
            instructions.push(DrawInstruction::centered(
                FontRole::Title,
                &lines.first,
                x,
                y1,
                title_size,
            ));
            instructions.push(DrawInstruction::centered(
                FontRole::Title,
                second,
                x,
                y2,
                title_size,
            ));
        }
    }

    let color = mode.fixed_color();
    for instruction in &mut instructions {
        instruction.color = color;
    }

    Ok(BandLayout {
        author_font_size: author_size,
        title_font_size: title_size,
        base_title_font_size: base_title,
        instructions,
    })
}
