//! Cover planning: every rectangle and text run, before any pixel.
//!
//! [`plan_cover`] needs only image sizes, so it can run from file headers.
//! It is also where every precondition is checked: a plan that succeeds can
//! be painted without further validation of inputs.

use super::spine::{SpineLayout, layout_spine};
use crate::config::{CoverConfig, PrintConfig};
use crate::error::{AssetKind, CoverError, Result};
use crate::imaging::{
    HashGrid, PhysicalSpec, PixelGeometry, Rect, bottom_band, cm_to_pixels,
    raster::height_for_width,
};
use crate::naming::output_filename;
use crate::text::typography::BandFrame;
use crate::text::{BandLayout, TextRasterizer, TypographyMode, layout_band, split_title};
use crate::variant::{Arrangement, LayoutVariant};
use serde::Serialize;
use tracing::debug;

/// What to put on the cover.
#[derive(Debug, Clone)]
pub struct CoverRequest<'a> {
    pub variant: &'a LayoutVariant,
    pub author: String,
    /// Raw title; a line break forces a two-line layout.
    pub title: String,
    pub typography: TypographyMode,
    /// Required by print variants, ignored otherwise.
    pub spec: Option<PhysicalSpec>,
}

/// Pixel sizes of the loaded assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetSizes {
    pub source: Option<(u32, u32)>,
    pub logo: Option<(u32, u32)>,
    pub barcode: Option<(u32, u32)>,
}

impl AssetSizes {
    fn require(size: Option<(u32, u32)>, kind: AssetKind) -> Result<(u32, u32)> {
        match size {
            Some((w, h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(CoverError::MissingAsset(kind)),
        }
    }
}

/// Panels of a print spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadPanels {
    pub back: Rect,
    pub spine: Rect,
    pub front: Rect,
    /// Back panel minus bleed; holds the band and the barcode.
    pub back_safe: Rect,
}

/// The complete layout of one cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverPlan {
    pub variant: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub spec: Option<PhysicalSpec>,
    pub geometry: Option<PixelGeometry>,
    pub panels: Option<SpreadPanels>,
    pub band: Rect,
    pub hash_grid: HashGrid,
    pub band_text: BandLayout,
    pub spine: Option<SpineLayout>,
    pub barcode: Option<Rect>,
}

/// Lay out a cover from its request and asset sizes.
///
/// Fails before anything is measured when an asset the variant needs is
/// missing, when override typography has no size, or when a print variant
/// has no physical spec.
pub fn plan_cover(
    request: &CoverRequest,
    sizes: &AssetSizes,
    config: &CoverConfig,
    rasterizer: &dyn TextRasterizer,
) -> Result<CoverPlan> {
    let variant = request.variant;
    let source = AssetSizes::require(sizes.source, AssetKind::Source)?;
    let print_assets = match variant.arrangement {
        Arrangement::SinglePanel => None,
        Arrangement::PrintSpread => Some((
            AssetSizes::require(sizes.logo, AssetKind::Logo)?,
            AssetSizes::require(sizes.barcode, AssetKind::Barcode)?,
        )),
    };
    request.typography.validate()?;

    let lines = split_title(&request.title);
    let hash_grid = config.band.grid_for(variant.hash_grid);
    let filename = output_filename(variant.arrangement, &request.title);

    let plan = match print_assets {
        None => {
            let (width, height) = source;
            let band = bottom_band(Rect::new(0, 0, width, height), config.band.height_fraction);
            let frame = BandFrame {
                band,
                reference_height: height as f64,
                center_x: band.center_x(),
            };
            let band_text = layout_band(
                &request.author,
                &lines,
                &frame,
                &request.typography,
                &config.typography,
            )?;
            CoverPlan {
                variant: variant.id.to_string(),
                filename,
                width,
                height,
                spec: None,
                geometry: None,
                panels: None,
                band,
                hash_grid,
                band_text,
                spine: None,
                barcode: None,
            }
        }
        Some((logo, barcode)) => {
            let spec = request.spec.ok_or_else(|| {
                CoverError::InvalidConfiguration(format!(
                    "variant '{}' needs physical cover measurements",
                    variant.id
                ))
            })?;
            let geometry = PixelGeometry::from_spec(&spec, source.0, variant.rounding)?;
            let (width, height) = geometry.canvas_size();
            let panels = SpreadPanels {
                back: geometry.back_panel(),
                spine: geometry.spine_panel(),
                front: geometry.front_panel(),
                back_safe: geometry.back_safe_area(),
            };
            for panel in [panels.back, panels.spine, panels.front, panels.back_safe] {
                panel.ensure_within(width, height)?;
            }

            let band = bottom_band(panels.back_safe, config.band.height_fraction);
            band.ensure_within(width, height)?;
            let barcode_rect =
                place_barcode(&geometry, panels.back_safe, band, barcode, &config.print)?;
            let spine = layout_spine(
                &geometry,
                logo,
                &request.author,
                &lines.first,
                &config.print,
                rasterizer,
            )?;
            let frame = BandFrame {
                band,
                reference_height: panels.back_safe.height as f64,
                center_x: panels.back_safe.center_x(),
            };
            let band_text = layout_band(
                &request.author,
                &lines,
                &frame,
                &request.typography,
                &config.typography,
            )?;
            CoverPlan {
                variant: variant.id.to_string(),
                filename,
                width,
                height,
                spec: Some(spec),
                geometry: Some(geometry),
                panels: Some(panels),
                band,
                hash_grid,
                band_text,
                spine: Some(spine),
                barcode: Some(barcode_rect),
            }
        }
    };
    debug!(
        variant = %plan.variant,
        width = plan.width,
        height = plan.height,
        title_font_size = plan.band_text.title_font_size,
        "Cover planned"
    );
    Ok(plan)
}

/// Centre the barcode horizontally in the safe area, a fixed gap above the band.
///
/// The barcode is never shrunk to fit vertically: if it would stick out of
/// the top of the safe area the layout is rejected.
pub fn place_barcode(
    geometry: &PixelGeometry,
    safe: Rect,
    band: Rect,
    barcode_size: (u32, u32),
    config: &PrintConfig,
) -> Result<Rect> {
    let width = cm_to_pixels(config.barcode_width_cm, geometry.pixel_per_cm).min(safe.width as f64);
    let height = height_for_width(barcode_size, width);
    let gap = cm_to_pixels(config.barcode_gap_cm, geometry.pixel_per_cm);
    let top = band.y as f64 - gap - height;
    let left = safe.center_x() - width / 2.0;

    let rect = Rect::new(
        left.round().max(0.0) as u32,
        top.round().max(0.0) as u32,
        geometry.rounding.apply(width),
        geometry.rounding.apply(height),
    );
    if top.round() < safe.y as f64 || rect.is_empty() {
        return Err(CoverError::InvalidGeometry {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bounds_width: safe.width,
            bounds_height: safe.height,
        });
    }
    Ok(rect)
}
