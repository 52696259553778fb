//! Suggested output filenames.
//!
//! Digital covers are named after the book so a download folder stays
//! readable; print spreads always get the same literal name.
//!
//! - `"Dawn"` → `Dawn.jpg`
//! - `"Dawn\nat Sea"` → `Dawn at Sea.jpg` (first line break only)
//! - `"AC/DC: Live"` → `AC-DC- Live.jpg`
//! - `""` → `cover.jpg`

use crate::variant::Arrangement;

/// Filename of every print spread.
pub const PRINT_FILENAME: &str = "printCover.jpg";
/// Fallback when a title has nothing usable in it.
pub const FALLBACK_FILENAME: &str = "cover.jpg";

const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Filename for a cover of the given arrangement and raw title.
pub fn output_filename(arrangement: Arrangement, title: &str) -> String {
    match arrangement {
        Arrangement::PrintSpread => PRINT_FILENAME.to_string(),
        Arrangement::SinglePanel => digital_filename(title),
    }
}

fn digital_filename(title: &str) -> String {
    let joined = title.replacen('\n', " ", 1);
    let stem: String = joined
        .chars()
        .map(|c| {
            if ILLEGAL.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        format!("{stem}.jpg")
    }
}
