//! Layout variants.
//!
//! A variant bundles every decision that differs between cover products:
//! the panel arrangement, where the physical measurements come from, the
//! placeholder grid and the pixel rounding rule. The compositor only ever
//! reads a [`LayoutVariant`]; adding a product means adding a row to
//! [`VARIANTS`].
//!
//! | Id | Arrangement | Spec source | Grid | Rounding |
//! |---|---|---|---|---|
//! | `digital` | single panel | none | 2x2 | ceil |
//! | `digital-classic` | single panel | none | 4x3 | ceil |
//! | `print-simple` | print spread | fixed 30.158 x 22.225 cm | 2x2 | truncate |
//! | `print-bod` | print spread | dimension service | 2x2 | ceil |

use crate::error::{CoverError, Result};
use crate::imaging::{HashGrid, PhysicalSpec, PixelRounding, spine_width_cm};
use crate::provider::DimensionService;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arrangement {
    /// The photograph alone, band on its bottom.
    SinglePanel,
    /// Back, spine and front side by side.
    PrintSpread,
}

/// Where a variant's [`PhysicalSpec`] comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum SpecSource {
    /// Single panels have no physical size.
    None,
    /// Fixed spread size; the spine follows the page count.
    Fixed {
        total_width_cm: f64,
        total_height_cm: f64,
    },
    /// Asked from a [`DimensionService`] by page count.
    Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutVariant {
    pub id: &'static str,
    pub description: &'static str,
    pub arrangement: Arrangement,
    pub spec_source: SpecSource,
    pub hash_grid: HashGrid,
    pub rounding: PixelRounding,
}

pub const VARIANTS: &[LayoutVariant] = &[
    LayoutVariant {
        id: "digital",
        description: "E-book cover: the photograph with a frosted author/title band",
        arrangement: Arrangement::SinglePanel,
        spec_source: SpecSource::None,
        hash_grid: HashGrid::COARSE,
        rounding: PixelRounding::Ceil,
    },
    LayoutVariant {
        id: "digital-classic",
        description: "E-book cover with the finer 4x3 band of the first covers",
        arrangement: Arrangement::SinglePanel,
        spec_source: SpecSource::None,
        hash_grid: HashGrid::FINE,
        rounding: PixelRounding::Ceil,
    },
    LayoutVariant {
        id: "print-simple",
        description: "Paperback spread at a fixed 30.158 x 22.225 cm",
        arrangement: Arrangement::PrintSpread,
        spec_source: SpecSource::Fixed {
            total_width_cm: 30.158,
            total_height_cm: 22.225,
        },
        hash_grid: HashGrid::COARSE,
        rounding: PixelRounding::Truncate,
    },
    LayoutVariant {
        id: "print-bod",
        description: "Paperback spread measured by the Books-on-Demand calculator",
        arrangement: Arrangement::PrintSpread,
        spec_source: SpecSource::Provider,
        hash_grid: HashGrid::COARSE,
        rounding: PixelRounding::Ceil,
    },
];

/// Look a variant up by id.
pub fn find_variant(id: &str) -> Result<&'static LayoutVariant> {
    VARIANTS.iter().find(|v| v.id == id).ok_or_else(|| {
        let known: Vec<&str> = VARIANTS.iter().map(|v| v.id).collect();
        CoverError::InvalidConfiguration(format!(
            "unknown layout variant '{id}' (known: {})",
            known.join(", ")
        ))
    })
}

impl LayoutVariant {
    pub fn is_print(&self) -> bool {
        self.arrangement == Arrangement::PrintSpread
    }

    /// Resolve the physical measurements for this variant.
    ///
    /// Returns `None` for single-panel variants. Print variants need a page
    /// count; provider variants additionally need a service. Every spec is
    /// validated before it is returned, so an all-zero provider answer never
    /// reaches the compositor.
    pub fn resolve_spec(
        &self,
        page_count: Option<u32>,
        service: Option<&dyn DimensionService>,
    ) -> Result<Option<PhysicalSpec>> {
        let pages = || {
            page_count.ok_or_else(|| {
                CoverError::InvalidConfiguration(format!(
                    "variant '{}' needs a page count",
                    self.id
                ))
            })
        };
        let spec = match self.spec_source {
            SpecSource::None => return Ok(None),
            SpecSource::Fixed {
                total_width_cm,
                total_height_cm,
            } => PhysicalSpec {
                total_width_cm,
                total_height_cm,
                spine_width_cm: spine_width_cm(pages()?),
                edge_width_cm: 0.0,
            },
            SpecSource::Provider => {
                let service = service.ok_or_else(|| {
                    CoverError::InvalidConfiguration(format!(
                        "variant '{}' needs a dimension service",
                        self.id
                    ))
                })?;
                service.lookup(pages()?)?
            }
        };
        spec.validate()?;
        debug!(variant = self.id, ?spec, "Physical spec resolved");
        Ok(Some(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::{StubDimensions, bod_like_spec};

    #[test]
    fn every_id_is_unique() {
        for (i, a) in VARIANTS.iter().enumerate() {
            for b in &VARIANTS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn find_known_variants() {
        assert_eq!(find_variant("digital").unwrap().hash_grid, HashGrid::COARSE);
        assert_eq!(
            find_variant("digital-classic").unwrap().hash_grid,
            HashGrid::FINE
        );
        assert!(find_variant("print-bod").unwrap().is_print());
        assert_eq!(
            find_variant("print-simple").unwrap().rounding,
            PixelRounding::Truncate
        );
    }

    #[test]
    fn unknown_variant_lists_known_ids() {
        let err = find_variant("hardcover").unwrap_err();
        assert!(matches!(err, CoverError::InvalidConfiguration(m) if m.contains("print-simple")));
    }

    #[test]
    fn digital_has_no_spec() {
        let v = find_variant("digital").unwrap();
        assert_eq!(v.resolve_spec(None, None).unwrap(), None);
    }

    #[test]
    fn fixed_spec_uses_page_count() {
        let v = find_variant("print-simple").unwrap();
        let spec = v.resolve_spec(Some(300), None).unwrap().unwrap();
        assert_eq!(spec.total_width_cm, 30.158);
        assert!((spec.spine_width_cm - 1.8686).abs() < 1e-3);
        assert_eq!(spec.edge_width_cm, 0.0);
    }

    #[test]
    fn print_without_pages_is_invalid_configuration() {
        let v = find_variant("print-simple").unwrap();
        assert!(matches!(
            v.resolve_spec(None, None),
            Err(CoverError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn provider_spec_comes_from_service() {
        let v = find_variant("print-bod").unwrap();
        let stub = StubDimensions::returning(bod_like_spec());
        let spec = v.resolve_spec(Some(342), Some(&stub)).unwrap().unwrap();
        assert_eq!(spec, bod_like_spec());
    }

    #[test]
    fn provider_without_service_is_invalid_configuration() {
        let v = find_variant("print-bod").unwrap();
        assert!(matches!(
            v.resolve_spec(Some(342), None),
            Err(CoverError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn provider_zero_spec_is_rejected() {
        let v = find_variant("print-bod").unwrap();
        let stub = StubDimensions::returning(PhysicalSpec::zeroed());
        let err = v.resolve_spec(Some(342), Some(&stub)).unwrap_err();
        assert!(matches!(err, CoverError::InvalidConfiguration(m) if m.contains("all zeros")));
    }

    #[test]
    fn provider_failure_propagates() {
        let v = find_variant("print-bod").unwrap();
        let stub = StubDimensions::failing();
        assert!(matches!(
            v.resolve_spec(Some(342), Some(&stub)),
            Err(CoverError::ExternalLookupFailed(_))
        ));
    }
}
