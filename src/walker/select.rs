//! Deterministic choice among sibling variants
//!
//! Quality, file and server levels each apply this policy on their own
//! candidate set; it is not a global ranking.

use crate::walker::VariantEntry;

/// Keywords in descending order of preference
pub const QUALITY_PRIORITY: &[&str] = &["1080", "720", "640", "480", "original", "hd"];

/// Picks the preferred variant
///
/// Samples are excluded first; if that leaves nothing, the first variant is
/// returned as-is. Otherwise the highest-priority keyword found in any name
/// wins (earliest variant on ties), falling back to the first non-sample.
pub fn select_best(variants: &[VariantEntry]) -> Option<&VariantEntry> {
    let first = variants.first()?;

    let candidates: Vec<&VariantEntry> = variants.iter().filter(|v| !is_sample(v)).collect();
    if candidates.is_empty() {
        return Some(first);
    }

    QUALITY_PRIORITY
        .iter()
        .find_map(|keyword| {
            candidates
                .iter()
                .find(|v| v.name.to_lowercase().contains(keyword))
                .copied()
        })
        .or_else(|| candidates.first().copied())
}

fn is_sample(variant: &VariantEntry) -> bool {
    variant.name.to_lowercase().contains("sample")
}
