//! Pure classification of raw lyrics bodies.

use crate::protocol::LyricsClassification;

/// Exact placeholder substring the catalog substitutes for lyrics withheld
/// from non-commercial API plans. Matching is deliberately literal: if
/// upstream rewords the placeholder, affected tracks reclassify as
/// `Available` or `Unknown`. That fragility is inherent to the scraped API
/// and is kept as a known limitation.
pub const COMMERCIAL_PLACEHOLDER: &str =
    "******* This Lyrics is NOT for Commercial use *******";

/// Maps a raw lyrics body to exactly one classification. No side effects,
/// no failure mode.
pub fn classify(body: Option<&str>) -> LyricsClassification {
    let Some(body) = body else {
        return LyricsClassification::Unknown;
    };
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return LyricsClassification::Unknown;
    }
    if body.contains(COMMERCIAL_PLACEHOLDER) {
        return LyricsClassification::CommercialHold;
    }
    LyricsClassification::Available(trimmed.to_string())
}
