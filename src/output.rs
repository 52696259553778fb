//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Digital cover
//!
//! ```text
//! digital 1000x800
//!     Band: 1000x192 at (0, 608), 2x2 grid
//!     Author: Jane Doe (32pt)
//!     Title: A Short Title (45pt)
//!     Text: black (band probe 612)
//! → covers/A Short Title.jpg
//! ```
//!
//! ## Print spread
//!
//! ```text
//! print-simple 2132x1571
//!     Spec: 30.158 x 22.225 cm, spine 1.869 cm, bleed 0 cm
//!     Panels: back 1000 | spine 132 | front 1000 px
//!     Spine: logo 116x58, author 38.3pt, title 42.3pt
//!     Barcode: 283x141 at (359, 1016)
//!     Band: 1000x378 at (0, 1193), 2x2 grid
//!     Author: Jane Doe (24pt)
//!     Title: A Short Title (89pt)
//!     Text: white (band probe 141)
//! → covers/printCover.jpg
//! ```
//!
//! # Architecture
//!
//! Every view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compose::{ComposedCover, CoverPlan};
use crate::imaging::{HashGrid, Rect, TextColor};
use crate::text::{DrawInstruction, FontRole};
use crate::variant::{LayoutVariant, SpecSource};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

fn indent(line: String) -> String {
    format!("    {line}")
}

fn rect_line(rect: Rect) -> String {
    format!("{}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y)
}

fn grid_label(grid: HashGrid) -> String {
    format!("{}x{}", grid.x, grid.y)
}

fn color_label(color: TextColor) -> &'static str {
    match color {
        TextColor::Black => "black",
        TextColor::White => "white",
    }
}

/// Trim a float for display: at most three decimals, no trailing zeros.
fn num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// `Title: Dawn / at Sea (23pt)`; band lines of one role joined.
fn text_line(
    label: &str,
    role: FontRole,
    instructions: &[DrawInstruction],
    size: u32,
) -> Option<String> {
    let runs: Vec<&str> = instructions
        .iter()
        .filter(|i| i.role == role)
        .map(|i| i.text.as_str())
        .collect();
    if runs.is_empty() {
        return None;
    }
    Some(format!("{label}: {} ({size}pt)", runs.join(" / ")))
}

// ============================================================================
// Plan
// ============================================================================

/// Layout summary of a cover, without the outcome of painting it.
pub fn format_plan(plan: &CoverPlan) -> Vec<String> {
    let mut lines = vec![format!("{} {}x{}", plan.variant, plan.width, plan.height)];

    if let Some(spec) = &plan.spec {
        lines.push(indent(format!(
            "Spec: {} x {} cm, spine {} cm, bleed {} cm",
            num(spec.total_width_cm),
            num(spec.total_height_cm),
            num(spec.spine_width_cm),
            num(spec.edge_width_cm)
        )));
    }
    if let Some(panels) = &plan.panels {
        lines.push(indent(format!(
            "Panels: back {} | spine {} | front {} px",
            panels.back.width, panels.spine.width, panels.front.width
        )));
    }
    if let Some(spine) = &plan.spine {
        let mut parts = vec![format!("logo {}x{}", spine.logo.width, spine.logo.height)];
        for (name, instruction) in ["author", "title"].iter().zip(&spine.instructions) {
            parts.push(format!("{name} {}pt", num(instruction.font_size as f64)));
        }
        lines.push(indent(format!("Spine: {}", parts.join(", "))));
    }
    if let Some(barcode) = plan.barcode {
        lines.push(indent(format!("Barcode: {}", rect_line(barcode))));
    }

    lines.push(indent(format!(
        "Band: {}, {} grid",
        rect_line(plan.band),
        grid_label(plan.hash_grid)
    )));
    let text = &plan.band_text;
    let author = text_line(
        "Author",
        FontRole::Author,
        &text.instructions,
        text.author_font_size,
    );
    let title = text_line("Title", FontRole::Title, &text.instructions, text.title_font_size);
    lines.extend(author.map(indent));
    lines.extend(title.map(indent));
    lines
}

pub fn print_plan(plan: &CoverPlan) {
    for line in format_plan(plan) {
        println!("{line}");
    }
}

// ============================================================================
// Composed cover
// ============================================================================

/// Plan summary plus the chosen text colour and where the file went.
pub fn format_cover_report(cover: &ComposedCover, written: &Path) -> Vec<String> {
    let mut lines = format_plan(&cover.plan);
    let forced = cover
        .plan
        .band_text
        .instructions
        .iter()
        .find_map(|i| i.color);
    let text = match forced {
        Some(color) => format!("Text: {} (override)", color_label(color)),
        None => format!(
            "Text: {} (band probe {})",
            color_label(cover.band.text_color),
            cover.band.probe_sum
        ),
    };
    lines.push(indent(text));
    lines.push(format!("→ {}", written.display()));
    lines
}

pub fn print_cover_report(cover: &ComposedCover, written: &Path) {
    for line in format_cover_report(cover, written) {
        println!("{line}");
    }
}

// ============================================================================
// Variants
// ============================================================================

pub fn format_variants(variants: &[LayoutVariant]) -> Vec<String> {
    let width = variants.iter().map(|v| v.id.len()).max().unwrap_or(0);
    let mut lines = Vec::new();
    for v in variants {
        lines.push(format!("{:width$}  {}", v.id, v.description));
        let source = match v.spec_source {
            SpecSource::None => "no physical size".to_string(),
            SpecSource::Fixed {
                total_width_cm,
                total_height_cm,
            } => format!(
                "fixed {} x {} cm",
                num(total_width_cm),
                num(total_height_cm)
            ),
            SpecSource::Provider => "dimension service".to_string(),
        };
        lines.push(indent(format!(
            "{}, {} grid, {:?} rounding",
            source,
            grid_label(v.hash_grid),
            v.rounding
        )));
    }
    lines
}

pub fn print_variants(variants: &[LayoutVariant]) {
    for line in format_variants(variants) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{AssetSizes, CoverRequest, plan_cover};
    use crate::config::CoverConfig;
    use crate::text::TypographyMode;
    use crate::text::backend::tests::MockRasterizer;
    use crate::variant::{VARIANTS, find_variant};

    fn plan(variant: &str, title: &str) -> CoverPlan {
        let variant = find_variant(variant).unwrap();
        let spec = variant.resolve_spec(Some(300), None).unwrap();
        let request = CoverRequest {
            variant,
            author: "Jane Doe".into(),
            title: title.into(),
            typography: TypographyMode::Auto,
            spec,
        };
        let sizes = AssetSizes {
            source: Some((1000, 800)),
            logo: Some((200, 100)),
            barcode: Some((300, 150)),
        };
        plan_cover(&request, &sizes, &CoverConfig::default(), &MockRasterizer::new()).unwrap()
    }

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(30.158), "30.158");
        assert_eq!(num(2.0), "2");
        assert_eq!(num(1.86864), "1.869");
        assert_eq!(num(0.0), "0");
    }

    #[test]
    fn digital_plan_lines() {
        let lines = format_plan(&plan("digital", "A Short Title"));
        assert_eq!(
            lines,
            vec![
                "digital 1000x800",
                "    Band: 1000x192 at (0, 608), 2x2 grid",
                "    Author: Jane Doe (32pt)",
                "    Title: A Short Title (45pt)",
            ]
        );
    }

    #[test]
    fn two_line_title_joined() {
        let lines = format_plan(&plan("digital", "Dawn\nat Sea"));
        assert!(lines.iter().any(|l| l.contains("Title: Dawn / at Sea")));
    }

    #[test]
    fn print_plan_lists_spread_parts() {
        let lines = format_plan(&plan("print-simple", "Dawn"));
        assert!(lines[0].starts_with("print-simple "));
        assert!(lines[1].starts_with("    Spec: 30.158 x 22.225 cm, spine 1.869 cm"));
        assert!(lines[2].starts_with("    Panels: back 1000 | spine "));
        assert!(lines[3].starts_with("    Spine: logo "));
        assert!(lines[4].starts_with("    Barcode: "));
        assert!(lines[5].starts_with("    Band: "));
    }

    #[test]
    fn variants_listing_has_two_lines_each() {
        let lines = format_variants(VARIANTS);
        assert_eq!(lines.len(), VARIANTS.len() * 2);
        assert!(lines[0].starts_with("digital "));
        let fixed = "fixed 30.158 x 22.225 cm, 2x2 grid, Truncate rounding";
        assert!(lines.iter().any(|l| l.contains(fixed)));
        assert!(lines.iter().any(|l| l.contains("dimension service")));
    }
}
