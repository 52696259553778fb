//! Executes draw instructions on a canvas.
//!
//! A sprite from the [`TextRasterizer`] is positioned so that its anchor
//! point lands on the instruction's `(x, y)`. In sprite-local coordinates,
//! with the origin on the left end of the baseline, the anchor is at
//! `(lx, ly)`:
//!
//! ```text
//! lx = 0 (left) | w/2 (center)
//! ly = baseline (baseline) | h/2 (middle)
//! ```
//!
//! Unrotated, the sprite's top-left goes to `(x - lx, y - ly)`. Rotated 270°
//! the sprite becomes `h` wide and `w` tall, reads bottom to top, and its
//! top-left goes to `(x - ly, y - (w - lx))`.

use crate::error::Result;
use crate::imaging::{Rect, TextColor, raster};
use crate::text::{DrawInstruction, HorizontalAlign, Rotation, TextRasterizer, VerticalAnchor};
use image::{RgbaImage, imageops};

/// Top-left corner of the (possibly rotated) sprite on the canvas.
pub fn sprite_origin(
    instruction: &DrawInstruction,
    width: u32,
    height: u32,
    baseline: u32,
) -> (i64, i64) {
    let (w, h) = (width as f64, height as f64);
    let lx = match instruction.align {
        HorizontalAlign::Left => 0.0,
        HorizontalAlign::Center => w / 2.0,
    };
    let ly = match instruction.anchor {
        VerticalAnchor::Baseline => baseline as f64,
        VerticalAnchor::Middle => h / 2.0,
    };
    let (x, y) = match instruction.rotation {
        Rotation::None => (instruction.x - lx, instruction.y - ly),
        Rotation::Deg270 => (instruction.x - ly, instruction.y - (w - lx)),
    };
    (x.round() as i64, y.round() as i64)
}

/// Rasterize one instruction and composite it inside `clip`.
///
/// `probe_color` is used when the instruction leaves the colour to the band.
pub fn draw_text(
    canvas: &mut RgbaImage,
    instruction: &DrawInstruction,
    probe_color: TextColor,
    rasterizer: &dyn TextRasterizer,
    clip: Rect,
) -> Result<()> {
    if instruction.text.is_empty() {
        return Ok(());
    }
    let color = instruction.color.unwrap_or(probe_color).rgba();
    let sprite = rasterizer.rasterize(
        instruction.role,
        &instruction.text,
        instruction.font_size,
        color,
    )?;
    let (x, y) = sprite_origin(instruction, sprite.width(), sprite.height(), sprite.baseline);
    match instruction.rotation {
        Rotation::None => raster::paste_clipped(canvas, &sprite.image, x, y, clip),
        Rotation::Deg270 => {
            let rotated = imageops::rotate270(&sprite.image);
            raster::paste_clipped(canvas, &rotated, x, y, clip);
        }
    }
    Ok(())
}

/// Scale `src` into `target` and composite it, never outside `clip`.
pub fn paint_image(canvas: &mut RgbaImage, src: &RgbaImage, target: Rect, clip: Rect) {
    if target.is_empty() {
        return;
    }
    if target == clip {
        raster::paint_scaled(canvas, src, target);
        return;
    }
    let scaled = imageops::resize(
        src,
        target.width,
        target.height,
        imageops::FilterType::Lanczos3,
    );
    raster::paste_clipped(canvas, &scaled, target.x as i64, target.y as i64, clip);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::solid_image;
    use crate::text::FontRole;
    use crate::text::backend::tests::MockRasterizer;
    use image::Rgba;

    fn instruction(
        align: HorizontalAlign,
        anchor: VerticalAnchor,
        rotation: Rotation,
    ) -> DrawInstruction {
        DrawInstruction {
            role: FontRole::Title,
            text: "abcd".into(),
            x: 50.0,
            y: 500.0,
            font_size: 20.0,
            color: None,
            align,
            anchor,
            rotation,
        }
    }

    #[test]
    fn centred_baseline_origin() {
        let i = instruction(HorizontalAlign::Center, VerticalAnchor::Baseline, Rotation::None);
        assert_eq!(sprite_origin(&i, 100, 20, 16), (0, 484));
    }

    #[test]
    fn rotated_left_middle_origin() {
        // Rotated sprite is 20 wide, 100 tall, centred on x and ending at y.
        let i = instruction(HorizontalAlign::Left, VerticalAnchor::Middle, Rotation::Deg270);
        assert_eq!(sprite_origin(&i, 100, 20, 16), (40, 400));
    }

    #[test]
    fn rotated_centre_middle_origin() {
        let i = instruction(HorizontalAlign::Center, VerticalAnchor::Middle, Rotation::Deg270);
        assert_eq!(sprite_origin(&i, 100, 20, 16), (40, 450));
    }

    #[test]
    fn draw_uses_probe_colour_when_unset() {
        let mut canvas = solid_image(200, 100, [0, 0, 0, 255]);
        let mock = MockRasterizer::new();
        let mut i = instruction(HorizontalAlign::Center, VerticalAnchor::Baseline, Rotation::None);
        i.x = 100.0;
        i.y = 60.0;
        draw_text(&mut canvas, &i, TextColor::White, &mock, Rect::new(0, 0, 200, 100)).unwrap();
        // 4 chars * 10 px wide, 20 tall, baseline at 16 → x 80..120, y 44..64
        assert_eq!(canvas.get_pixel(100, 50), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(79, 50), &Rgba([0, 0, 0, 255]));
        assert_eq!(mock.get_operations()[0].color, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn draw_clips_to_panel() {
        let mut canvas = solid_image(200, 100, [0, 0, 0, 255]);
        let mock = MockRasterizer::new();
        let mut i = instruction(HorizontalAlign::Left, VerticalAnchor::Baseline, Rotation::None);
        i.x = 90.0;
        i.y = 50.0;
        i.color = Some(TextColor::White);
        draw_text(&mut canvas, &i, TextColor::Black, &mock, Rect::new(0, 0, 100, 100)).unwrap();
        assert_eq!(canvas.get_pixel(95, 45), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(105, 45), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn draw_rotated_runs_vertically() {
        let mut canvas = solid_image(100, 200, [0, 0, 0, 255]);
        let mock = MockRasterizer::new();
        let mut i = instruction(HorizontalAlign::Left, VerticalAnchor::Middle, Rotation::Deg270);
        i.x = 50.0;
        i.y = 150.0;
        i.color = Some(TextColor::White);
        draw_text(&mut canvas, &i, TextColor::Black, &mock, Rect::new(0, 0, 100, 200)).unwrap();
        // 40x20 sprite rotated → 20 wide (40..60), 40 tall (110..150)
        assert_eq!(canvas.get_pixel(50, 120), &Rgba([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(50, 151), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(65, 120), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn empty_text_is_skipped() {
        let mut canvas = solid_image(10, 10, [0, 0, 0, 255]);
        let mock = MockRasterizer::new();
        let mut i = instruction(HorizontalAlign::Center, VerticalAnchor::Baseline, Rotation::None);
        i.text.clear();
        draw_text(&mut canvas, &i, TextColor::White, &mock, Rect::new(0, 0, 10, 10)).unwrap();
        assert!(mock.get_operations().is_empty());
    }

    #[test]
    fn paint_image_respects_clip() {
        let mut canvas = solid_image(100, 100, [0, 0, 0, 255]);
        let logo = solid_image(10, 10, [255, 0, 0, 255]);
        paint_image(&mut canvas, &logo, Rect::new(40, 10, 40, 40), Rect::new(30, 0, 30, 100));
        let inside = canvas.get_pixel(50, 20);
        assert!(inside[0] > 250 && inside[1] < 5);
        assert_eq!(canvas.get_pixel(65, 20), &Rgba([0, 0, 0, 255]));
    }
}
