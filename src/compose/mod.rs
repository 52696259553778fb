//! Panel compositor.
//!
//! Turns a [`CoverRequest`] plus decoded assets into a finished raster. All
//! variants go through the same two steps:
//!
//! 1. [`plan_cover`] checks preconditions and lays everything out.
//! 2. The plan is painted onto a fresh canvas.
//!
//! Print spreads are painted in a fixed order, each step touching only its
//! own panel:
//!
//! ```text
//! blurred + tinted back  →  front image  →  spine fill  →  logo
//!   →  spine author  →  spine title  →  barcode  →  frosted band + text
//! ```
//!
//! Digital covers start from the photograph itself and only get the band.

mod draw;
mod plan;
pub mod spine;

pub use plan::{AssetSizes, CoverPlan, CoverRequest, SpreadPanels, place_barcode, plan_cover};
pub use spine::SpineLayout;

use crate::config::{CoverConfig, parse_hex_color};
use crate::error::{AssetKind, CoverError, Result};
use crate::imaging::{FrostedBand, Quality, Rect, SourceImage, TextColor, frost_band, raster};
use crate::text::TextRasterizer;
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Decoded input images. Which ones are required depends on the variant.
#[derive(Debug, Clone, Default)]
pub struct CoverAssets {
    pub source: Option<SourceImage>,
    /// Sharp front-panel image of a print spread; defaults to `source`.
    pub front: Option<SourceImage>,
    pub logo: Option<SourceImage>,
    pub barcode: Option<SourceImage>,
}

impl CoverAssets {
    /// Decode every given path, in order, before anything is composed.
    pub fn load(
        source: &Path,
        front: Option<&Path>,
        logo: Option<&Path>,
        barcode: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self {
            source: Some(SourceImage::open(source)?),
            front: front.map(SourceImage::open).transpose()?,
            logo: logo.map(SourceImage::open).transpose()?,
            barcode: barcode.map(SourceImage::open).transpose()?,
        })
    }

    pub fn sizes(&self) -> AssetSizes {
        let size = |img: &Option<SourceImage>| img.as_ref().map(|i| (i.width(), i.height()));
        AssetSizes {
            source: size(&self.source),
            logo: size(&self.logo),
            barcode: size(&self.barcode),
        }
    }

    fn require(&self, kind: AssetKind) -> Result<&SourceImage> {
        let asset = match kind {
            AssetKind::Source => &self.source,
            AssetKind::Logo => &self.logo,
            AssetKind::Barcode => &self.barcode,
        };
        asset.as_ref().ok_or(CoverError::MissingAsset(kind))
    }
}

/// A finished cover, ready to encode.
#[derive(Debug, Clone)]
pub struct ComposedCover {
    pub image: RgbaImage,
    pub filename: String,
    pub plan: CoverPlan,
    pub band: FrostedBand,
}

impl ComposedCover {
    pub fn encode(&self, quality: Quality) -> Result<Vec<u8>> {
        raster::encode_jpeg(&self.image, quality)
    }

    /// Encode and write to `dir/filename`, creating `dir` if needed.
    pub fn save(&self, dir: &Path, quality: Quality) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, self.encode(quality)?)?;
        info!(path = %path.display(), "Cover written");
        Ok(path)
    }
}

/// Composes covers with one configuration and one text backend.
pub struct Compositor<'a> {
    config: &'a CoverConfig,
    rasterizer: &'a dyn TextRasterizer,
}

impl<'a> Compositor<'a> {
    pub fn new(config: &'a CoverConfig, rasterizer: &'a dyn TextRasterizer) -> Self {
        Self { config, rasterizer }
    }

    /// Plan and paint one cover. Nothing is drawn unless planning succeeds.
    #[instrument(skip_all, fields(variant = request.variant.id))]
    pub fn compose(&self, request: &CoverRequest, assets: &CoverAssets) -> Result<ComposedCover> {
        let plan = plan_cover(request, &assets.sizes(), self.config, self.rasterizer)?;
        let source = assets.require(AssetKind::Source)?;
        let (image, band) = match plan.panels {
            None => self.paint_digital(&plan, source)?,
            Some(panels) => self.paint_print(&plan, &panels, assets, source)?,
        };
        info!(
            width = plan.width,
            height = plan.height,
            text_color = ?band.text_color,
            "Cover composed"
        );
        Ok(ComposedCover {
            image,
            filename: plan.filename.clone(),
            plan,
            band,
        })
    }

    fn paint_band(
        &self,
        canvas: &mut RgbaImage,
        plan: &CoverPlan,
        clip: Rect,
    ) -> Result<FrostedBand> {
        let band = frost_band(
            canvas,
            plan.band,
            plan.hash_grid,
            self.config.band.luminance_threshold,
        )?;
        for instruction in &plan.band_text.instructions {
            draw::draw_text(canvas, instruction, band.text_color, self.rasterizer, clip)?;
        }
        Ok(band)
    }

    fn paint_digital(
        &self,
        plan: &CoverPlan,
        source: &SourceImage,
    ) -> Result<(RgbaImage, FrostedBand)> {
        let mut canvas = source.pixels().clone();
        let full = Rect::new(0, 0, canvas.width(), canvas.height());
        let band = self.paint_band(&mut canvas, plan, full)?;
        Ok((canvas, band))
    }

    fn paint_print(
        &self,
        plan: &CoverPlan,
        panels: &SpreadPanels,
        assets: &CoverAssets,
        source: &SourceImage,
    ) -> Result<(RgbaImage, FrostedBand)> {
        let print = &self.config.print;
        let overlay = parse_hex_color(&print.back_overlay)?;
        let spine_color = parse_hex_color(&print.spine_color)?;
        let logo = assets.require(AssetKind::Logo)?;
        let barcode = assets.require(AssetKind::Barcode)?;
        let front = assets.front.as_ref().unwrap_or(source);
        let (spine, barcode_rect) = match (&plan.spine, plan.barcode) {
            (Some(spine), Some(rect)) => (spine, rect),
            _ => {
                return Err(CoverError::InvalidConfiguration(
                    "print plan without spine or barcode layout".into(),
                ));
            }
        };

        let mut canvas = RgbaImage::from_pixel(plan.width, plan.height, Rgba([0, 0, 0, 255]));

        let mut background = raster::heavy_blur(source.pixels(), print.blur_radius);
        raster::tint(&mut background, overlay);
        draw::paint_image(&mut canvas, &background, panels.back, panels.back);

        draw::paint_image(&mut canvas, front.pixels(), panels.front, panels.front);

        raster::fill_rect(&mut canvas, panels.spine, spine_color);
        draw::paint_image(&mut canvas, logo.pixels(), spine.logo, panels.spine);
        for instruction in &spine.instructions {
            draw::draw_text(
                &mut canvas,
                instruction,
                TextColor::White,
                self.rasterizer,
                panels.spine,
            )?;
        }

        draw::paint_image(&mut canvas, barcode.pixels(), barcode_rect, panels.back);

        let band = self.paint_band(&mut canvas, plan, panels.back)?;
        Ok((canvas, band))
    }
}
