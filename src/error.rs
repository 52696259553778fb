//! Error types for cover generation.
//!
//! Every failure aborts the current composition. Nothing is retried inside
//! the engine and no partial raster is ever returned: callers either get a
//! [`ComposedCover`](crate::compose::ComposedCover) or a [`CoverError`].
//!
//! The first four variants are the engine's own taxonomy. The rest wrap
//! transport failures from decoding, encoding, fonts and the filesystem.
//!
//! A dimension lookup that cannot be completed (network, HTTP status,
//! unparseable reply) is [`CoverError::ExternalLookupFailed`], not
//! `InvalidConfiguration`, so callers can tell a provider outage from a bad
//! setting. A lookup that completes with an all-zero or inconsistent spec
//! is still rejected as `InvalidConfiguration`.

use std::fmt;
use thiserror::Error;

/// Which input asset a composition was missing.
///
/// The front-panel image is never required: a print spread without one
/// shows the source photograph on the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The photograph the cover is built from.
    Source,
    /// The publisher logo painted on the spine.
    Logo,
    /// The ISBN barcode painted on the back panel.
    Barcode,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Source => "source image",
            AssetKind::Logo => "logo",
            AssetKind::Barcode => "barcode",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CoverError {
    /// Zero or negative physical dimension, unknown variant, missing override
    /// font size, all-zero provider spec.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("missing asset: {0} must be loaded before composition")]
    MissingAsset(AssetKind),

    /// A rectangle does not fit inside the raster it addresses.
    #[error(
        "invalid geometry: {width}x{height} at ({x}, {y}) exceeds {bounds_width}x{bounds_height}"
    )]
    InvalidGeometry {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bounds_width: u32,
        bounds_height: u32,
    },

    /// The provider could not be asked or its reply could not be read.
    #[error("cover dimension lookup failed: {0}")]
    ExternalLookupFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("failed to encode cover: {0}")]
    Encode(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("placeholder hash failed: {0}")]
    Placeholder(String),
}

pub type Result<T> = std::result::Result<T, CoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_names_the_asset() {
        let err = CoverError::MissingAsset(AssetKind::Barcode);
        assert_eq!(
            err.to_string(),
            "missing asset: barcode must be loaded before composition"
        );
    }

    #[test]
    fn invalid_geometry_reports_rect_and_bounds() {
        let err = CoverError::InvalidGeometry {
            x: 10,
            y: 20,
            width: 100,
            height: 50,
            bounds_width: 80,
            bounds_height: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("100x50 at (10, 20)"));
        assert!(msg.contains("80x60"));
    }

    #[test]
    fn required_assets_have_display_names() {
        let names: Vec<String> = [AssetKind::Source, AssetKind::Logo, AssetKind::Barcode]
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(names, vec!["source image", "logo", "barcode"]);
    }

    #[test]
    fn lookup_failure_is_its_own_kind() {
        let err = CoverError::ExternalLookupFailed("HTTP 503".into());
        assert_eq!(err.to_string(), "cover dimension lookup failed: HTTP 503");
        assert!(!matches!(err, CoverError::InvalidConfiguration(_)));
    }
}
