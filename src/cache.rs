//! Per-session cache of lyrics outcomes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::protocol::LyricsOutcome;

/// Cheaply cloneable handle to the session's track-id to outcome map.
///
/// Entries are write-once within a session: the first writer for an id wins
/// and later writers serve the stored value instead. The whole map is dropped
/// when a new search session starts.
#[derive(Clone, Default)]
pub struct ResultCache {
    entries: Arc<Mutex<HashMap<String, LyricsOutcome>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, track_id: &str) -> Option<LyricsOutcome> {
        self.entries
            .lock()
            .expect("result cache lock poisoned")
            .get(track_id)
            .cloned()
    }

    /// Inserts only when no entry exists for the id yet. Returns whether
    /// this caller's value was stored.
    pub fn put_if_absent(&self, track_id: &str, outcome: LyricsOutcome) -> bool {
        let mut entries = self.entries.lock().expect("result cache lock poisoned");
        if entries.contains_key(track_id) {
            return false;
        }
        entries.insert(track_id.to_string(), outcome);
        true
    }

    /// Drops every entry. Invoked at the start of each new search session.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("result cache lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ResultCache;
    use crate::protocol::{LyricsClassification, LyricsOutcome};

    fn hold() -> LyricsOutcome {
        LyricsOutcome::Classified(LyricsClassification::CommercialHold)
    }

    fn available(text: &str) -> LyricsOutcome {
        LyricsOutcome::Classified(LyricsClassification::Available(text.to_string()))
    }

    #[test]
    fn test_get_returns_none_for_unknown_id() {
        let cache = ResultCache::new();
        assert_eq!(cache.get("123"), None);
    }

    #[test]
    fn test_first_write_wins_for_an_id() {
        let cache = ResultCache::new();
        assert!(cache.put_if_absent("123", hold()));
        assert!(!cache.put_if_absent("123", available("later text")));
        assert_eq!(cache.get("123"), Some(hold()));
    }

    #[test]
    fn test_clear_drops_all_entries() {
        let cache = ResultCache::new();
        cache.put_if_absent("123", hold());
        cache.put_if_absent("456", available("text"));
        cache.clear();
        assert_eq!(cache.get("123"), None);
        assert_eq!(cache.get("456"), None);
    }

    #[test]
    fn test_cloned_handles_share_one_map() {
        let cache = ResultCache::new();
        let handle = cache.clone();
        assert!(handle.put_if_absent("123", hold()));
        assert_eq!(cache.get("123"), Some(hold()));
    }
}
