//! Pipeline data model and events shared by all runtime components.
//!
//! This module defines the payloads exchanged between the search and lyrics
//! workers and the polling consumer.

/// One track row returned by a catalog search. Immutable once surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Stable catalog track id.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Track artist.
    pub artist: String,
    /// Whether the catalog flags this track as having lyrics at all.
    pub has_lyrics_flag: bool,
}

/// Completion payload for one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Filtered track rows, in catalog order.
    Success(Vec<Track>),
    /// The upstream search call failed.
    Failure(String),
}

/// Classification of one raw lyrics body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsClassification {
    /// Real lyric text was returned.
    Available(String),
    /// Only the commercial-use placeholder was present; no text is carried.
    CommercialHold,
    /// Empty or missing lyrics body with no placeholder detected.
    Unknown,
}

/// Completion payload for one lyrics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsOutcome {
    Classified(LyricsClassification),
    /// The upstream call failed. Failed outcomes are never cached, so a
    /// later request for the same id retries upstream.
    Failed(String),
}

/// Events delivered to the polling consumer, in worker completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    SearchCompleted {
        /// Search session generation this outcome answers. Must match the
        /// session's current generation to be accepted.
        generation: u64,
        outcome: SearchOutcome,
    },
    LyricsCompleted {
        track_id: String,
        outcome: LyricsOutcome,
    },
}
