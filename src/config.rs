//! Cover configuration module.
//!
//! Handles loading, validating, and merging `cover.toml`. Stock defaults are
//! the calibration the covers were designed with; a user file overrides only
//! the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [typography]
//! author_base_font_size = 84   # pt at the 2100 px reference height
//! title_base_font_size = 118   # pt at the 2100 px reference height
//! reference_height = 2100      # px height the base sizes were tuned on
//! title_length_threshold = 15  # characters before the title starts shrinking
//! title_shrink_per_char = 4    # pt removed per character beyond the threshold
//! second_line_factor = 0.8     # multiplier when the title wraps to two lines
//! min_title_font_size = 1      # floor for very long titles
//!
//! [band]
//! height_fraction = 0.24       # bottom share of the panel that gets frosted
//! luminance_threshold = 382    # RGB sum above which text turns black
//! # hash_grid = [4, 3]         # override the variant's placeholder grid
//!
//! [print]
//! blur_radius = 100
//! back_overlay = "#00000088"
//! spine_color = "#222222"
//! spine_text = true
//! ...
//!
//! [fonts]
//! author = "fonts/Roboto-Light.ttf"
//! title = "fonts/Roboto-Regular.ttf"
//! spine = "fonts/LeagueSpartan-Regular.ttf"
//!
//! [assets]
//! logo = "assets/logo.png"
//!
//! [output]
//! quality = 90
//!
//! [provider]
//! endpoint = "https://www.bod.de/fileadmin/bod/php/include/utils.ajax.php"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::HashGrid;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for crate::error::CoverError {
    fn from(err: ConfigError) -> Self {
        crate::error::CoverError::InvalidConfiguration(err.to_string())
    }
}

/// Cover configuration loaded from `cover.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverConfig {
    pub typography: TypographyConfig,
    pub band: BandConfig,
    pub print: PrintConfig,
    pub fonts: FontsConfig,
    pub assets: AssetsConfig,
    pub output: OutputConfig,
    pub provider: ProviderConfig,
}

/// Font-size calibration for the author line and the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypographyConfig {
    pub author_base_font_size: f64,
    pub title_base_font_size: f64,
    /// Output height the base sizes were designed for.
    pub reference_height: f64,
    pub title_length_threshold: usize,
    pub title_shrink_per_char: f64,
    pub second_line_factor: f64,
    pub min_title_font_size: f64,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            author_base_font_size: 84.0,
            title_base_font_size: 118.0,
            reference_height: 2100.0,
            title_length_threshold: 15,
            title_shrink_per_char: 4.0,
            second_line_factor: 0.8,
            min_title_font_size: 1.0,
        }
    }
}

/// The frosted text band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BandConfig {
    pub height_fraction: f64,
    /// RGB sum (0-765) above which the band counts as light.
    pub luminance_threshold: u32,
    /// Overrides the layout variant's placeholder grid when set.
    pub hash_grid: Option<[u32; 2]>,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            height_fraction: 0.24,
            luminance_threshold: 382,
            hash_grid: None,
        }
    }
}

impl BandConfig {
    /// The grid to use for a variant whose own default is `variant_grid`.
    pub fn grid_for(&self, variant_grid: HashGrid) -> HashGrid {
        self.hash_grid
            .map(|[x, y]| HashGrid { x, y })
            .unwrap_or(variant_grid)
    }
}

/// Print spread constants: back-panel treatment, spine, barcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    pub blur_radius: u32,
    /// Translucent colour laid over the blurred back panel.
    pub back_overlay: String,
    pub spine_color: String,
    /// Draw author and title along the spine.
    pub spine_text: bool,
    /// Fixed part of the spine's top/bottom margin.
    pub spine_outer_distance_px: f64,
    /// Physical part of the spine's top/bottom margin.
    pub spine_outer_distance_cm: f64,
    pub logo_width_ratio: f64,
    pub logo_max_width_px: f64,
    pub spine_author_ratio: f64,
    pub spine_author_max_pt: f64,
    pub spine_title_ratio: f64,
    pub spine_title_max_pt: f64,
    pub barcode_width_cm: f64,
    /// Space between the barcode and the top of the back band.
    pub barcode_gap_cm: f64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            blur_radius: 100,
            back_overlay: "#00000088".to_string(),
            spine_color: "#222222".to_string(),
            spine_text: true,
            spine_outer_distance_px: 64.0,
            spine_outer_distance_cm: 0.5,
            logo_width_ratio: 0.88,
            logo_max_width_px: 210.0,
            spine_author_ratio: 0.29,
            spine_author_max_pt: 58.0,
            spine_title_ratio: 0.32,
            spine_title_max_pt: 64.0,
            barcode_width_cm: 4.0,
            barcode_gap_cm: 0.5,
        }
    }
}

/// Font files, one per text role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    pub author: PathBuf,
    pub title: PathBuf,
    pub spine: PathBuf,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            author: PathBuf::from("fonts/Roboto-Light.ttf"),
            title: PathBuf::from("fonts/Roboto-Regular.ttf"),
            spine: PathBuf::from("fonts/LeagueSpartan-Regular.ttf"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Publisher logo painted on every spine.
    pub logo: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            logo: PathBuf::from("assets/logo.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// Books-on-Demand cover dimension lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub endpoint: String,
    /// `einbandart`: PB = paperback.
    pub binding: String,
    /// `buchformat`, in cm.
    pub book_format: String,
    /// `papierfarbe`.
    pub paper: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.bod.de/fileadmin/bod/php/include/utils.ajax.php".to_string(),
            binding: "PB".to_string(),
            book_format: "12*19".to_string(),
            paper: "weiss80".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into an RGBA colour.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, ConfigError> {
    let invalid = || ConfigError::Validation(format!("'{value}' is not a hex colour"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 17;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                255
            };
            Ok(Rgba([r, g, b, a]))
        }
        _ => Err(invalid()),
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

impl CoverConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.typography;
        require_positive("typography.author_base_font_size", t.author_base_font_size)?;
        require_positive("typography.title_base_font_size", t.title_base_font_size)?;
        require_positive("typography.reference_height", t.reference_height)?;
        require_positive("typography.min_title_font_size", t.min_title_font_size)?;
        if !(t.title_shrink_per_char.is_finite() && t.title_shrink_per_char >= 0.0) {
            return Err(ConfigError::Validation(
                "typography.title_shrink_per_char must not be negative".into(),
            ));
        }
        if !(t.second_line_factor > 0.0 && t.second_line_factor <= 1.0) {
            return Err(ConfigError::Validation(
                "typography.second_line_factor must be in (0, 1]".into(),
            ));
        }

        let b = &self.band;
        if !(b.height_fraction > 0.0 && b.height_fraction < 1.0) {
            return Err(ConfigError::Validation(
                "band.height_fraction must be in (0, 1)".into(),
            ));
        }
        if b.luminance_threshold > 765 {
            return Err(ConfigError::Validation(
                "band.luminance_threshold must be 0-765".into(),
            ));
        }
        if let Some([x, y]) = b.hash_grid {
            if !(1..=9).contains(&x) || !(1..=9).contains(&y) {
                return Err(ConfigError::Validation(
                    "band.hash_grid components must be 1-9".into(),
                ));
            }
        }

        let p = &self.print;
        parse_hex_color(&p.back_overlay)?;
        parse_hex_color(&p.spine_color)?;
        require_positive("print.spine_outer_distance_px", p.spine_outer_distance_px)?;
        require_positive("print.logo_width_ratio", p.logo_width_ratio)?;
        require_positive("print.logo_max_width_px", p.logo_max_width_px)?;
        require_positive("print.spine_author_ratio", p.spine_author_ratio)?;
        require_positive("print.spine_author_max_pt", p.spine_author_max_pt)?;
        require_positive("print.spine_title_ratio", p.spine_title_ratio)?;
        require_positive("print.spine_title_max_pt", p.spine_title_max_pt)?;
        require_positive("print.barcode_width_cm", p.barcode_width_cm)?;
        if p.spine_outer_distance_cm < 0.0 || p.barcode_gap_cm < 0.0 {
            return Err(ConfigError::Validation(
                "print distances must not be negative".into(),
            ));
        }

        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CoverConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CoverConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CoverConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `path` over the stock defaults. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<CoverConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock `cover.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Cover Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Typography
# ---------------------------------------------------------------------------
[typography]
# Base sizes in pt, tuned on a cover 2100 px tall. Actual sizes scale with
# the output height: ceil(base / reference_height * height).
author_base_font_size = 84.0
title_base_font_size = 118.0
reference_height = 2100.0

# Titles longer than this (first line, in characters) start shrinking...
title_length_threshold = 15
# ...by this many pt per extra character.
title_shrink_per_char = 4.0
# Two-line titles are multiplied by this factor (then rounded up).
second_line_factor = 0.8
# Long titles never shrink below this base size.
min_title_font_size = 1.0

# ---------------------------------------------------------------------------
# Frosted text band
# ---------------------------------------------------------------------------
[band]
# Bottom share of the panel that is replaced by its blurred placeholder.
height_fraction = 0.24
# RGB sum (0-765) of the band above which text is drawn black instead of white.
luminance_threshold = 382
# Placeholder components [x, y]. Omit to use the layout variant's own grid.
# hash_grid = [4, 3]

# ---------------------------------------------------------------------------
# Print spreads
# ---------------------------------------------------------------------------
[print]
blur_radius = 100
back_overlay = "#00000088"
spine_color = "#222222"
spine_text = true
# Spine margin = spine_outer_distance_px + spine_outer_distance_cm (in px).
spine_outer_distance_px = 64.0
spine_outer_distance_cm = 0.5
# Logo width = min(spine width * logo_width_ratio, logo_max_width_px).
logo_width_ratio = 0.88
logo_max_width_px = 210.0
# Spine font sizes = min(spine width * ratio, max) pt.
spine_author_ratio = 0.29
spine_author_max_pt = 58.0
spine_title_ratio = 0.32
spine_title_max_pt = 64.0
# Barcode on the back panel, centred above the text band.
barcode_width_cm = 4.0
barcode_gap_cm = 0.5

# ---------------------------------------------------------------------------
# Fonts (TrueType / OpenType files)
# ---------------------------------------------------------------------------
[fonts]
author = "fonts/Roboto-Light.ttf"
title = "fonts/Roboto-Regular.ttf"
spine = "fonts/LeagueSpartan-Regular.ttf"

# ---------------------------------------------------------------------------
# Assets
# ---------------------------------------------------------------------------
[assets]
logo = "assets/logo.png"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Books-on-Demand dimension lookup (print-bod variant)
# ---------------------------------------------------------------------------
[provider]
endpoint = "https://www.bod.de/fileadmin/bod/php/include/utils.ajax.php"
binding = "PB"
book_format = "12*19"
paper = "weiss80"
timeout_secs = 30
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_calibration() {
        let config = CoverConfig::default();
        assert_eq!(config.typography.author_base_font_size, 84.0);
        assert_eq!(config.typography.title_base_font_size, 118.0);
        assert_eq!(config.typography.reference_height, 2100.0);
        assert_eq!(config.band.height_fraction, 0.24);
        assert_eq!(config.print.blur_radius, 100);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[typography]
title_base_font_size = 100.0
"#;
        let config: CoverConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.typography.title_base_font_size, 100.0);
        // Defaults preserved
        assert_eq!(config.typography.author_base_font_size, 84.0);
        assert_eq!(config.output.quality, 90);
    }

    // =========================================================================
    // Hex colours
    // =========================================================================

    #[test]
    fn parse_hex_color_forms() {
        assert_eq!(parse_hex_color("#222").unwrap(), Rgba([34, 34, 34, 255]));
        assert_eq!(parse_hex_color("#ff8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("#00000088").unwrap(), Rgba([0, 0, 0, 136]));
    }

    #[test]
    fn parse_hex_color_rejects_garbage() {
        assert!(parse_hex_color("222222").is_err());
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
        assert!(parse_hex_color("#ééé").is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("cover.toml")).unwrap();
        assert_eq!(config.output.quality, 90);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.toml");
        fs::write(
            &path,
            r##"
[print]
spine_color = "#101010"
spine_text = false
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.print.spine_color, "#101010");
        assert!(!config.print.spine_text);
        assert_eq!(config.print.blur_radius, 100);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<CoverConfig, _> = toml::from_str(
            r#"
[band]
height_fractoin = 0.3
"#,
        );
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<CoverConfig, _> = toml::from_str("[bands]\nheight_fraction = 0.3\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(CoverConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_reference_height() {
        let mut config = CoverConfig::default();
        config.typography.reference_height = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reference_height"));
    }

    #[test]
    fn validate_band_fraction_range() {
        let mut config = CoverConfig::default();
        config.band.height_fraction = 1.0;
        assert!(config.validate().is_err());
        config.band.height_fraction = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_hash_grid_range() {
        let mut config = CoverConfig::default();
        config.band.hash_grid = Some([4, 3]);
        assert!(config.validate().is_ok());
        config.band.hash_grid = Some([0, 3]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bad_colour() {
        let mut config = CoverConfig::default();
        config.print.spine_color = "dark grey".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_quality_range() {
        let mut config = CoverConfig::default();
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.toml");
        fs::write(&path, "[typography]\nsecond_line_factor = 1.5\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn config_error_maps_to_invalid_configuration() {
        let err: crate::error::CoverError = ConfigError::Validation("x".into()).into();
        assert!(matches!(
            err,
            crate::error::CoverError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn band_grid_override() {
        let mut band = BandConfig::default();
        assert_eq!(band.grid_for(HashGrid::COARSE), HashGrid::COARSE);
        band.hash_grid = Some([4, 3]);
        assert_eq!(band.grid_for(HashGrid::COARSE), HashGrid::FINE);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[print]
blur_radius = 100
spine_text = true
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[print]\nblur_radius = 40\n").unwrap();
        let merged = merge_toml(base, overlay);
        let print = merged.get("print").unwrap();
        assert_eq!(print.get("blur_radius").unwrap().as_integer(), Some(40));
        assert_eq!(print.get("spine_text").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[output]\nquality = 70\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.output.quality, 70);
        assert_eq!(config.band.luminance_threshold, 382);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: CoverConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = CoverConfig::default();
        assert_eq!(
            config.typography.title_base_font_size,
            defaults.typography.title_base_font_size
        );
        assert_eq!(config.print.back_overlay, defaults.print.back_overlay);
        assert_eq!(config.fonts.spine, defaults.fonts.spine);
        assert_eq!(config.provider.endpoint, defaults.provider.endpoint);
        assert_eq!(config.band.hash_grid, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in [
            "typography",
            "band",
            "print",
            "fonts",
            "assets",
            "output",
            "provider",
        ] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }
}
