//! Background lyrics retrieval with per-track coalescing.

use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use log::debug;

use crate::cache::ResultCache;
use crate::catalog::CatalogClient;
use crate::classifier;
use crate::protocol::{LyricsOutcome, ProbeEvent};

/// Spawns one background worker per uncached track id and reports each
/// completion over the event channel. At most one fetch per id is in flight
/// at a time; duplicate requests coalesce into the pending one.
pub struct LyricsFetcher {
    client: Arc<dyn CatalogClient>,
    cache: ResultCache,
    events: Sender<ProbeEvent>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl LyricsFetcher {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: ResultCache,
        events: Sender<ProbeEvent>,
    ) -> Self {
        Self {
            client,
            cache,
            events,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Requests lyrics for one track. The result arrives as a
    /// `LyricsCompleted` event; cached outcomes are replayed without a
    /// network call.
    pub fn request_lyrics(&self, track_id: &str) {
        if let Some(outcome) = self.cache.get(track_id) {
            debug!("Lyrics[{}]: serving cached outcome", track_id);
            let _ = self.events.send(ProbeEvent::LyricsCompleted {
                track_id: track_id.to_string(),
                outcome,
            });
            return;
        }

        {
            let mut in_flight = self.in_flight.lock().expect("in-flight set lock poisoned");
            if !in_flight.insert(track_id.to_string()) {
                debug!("Lyrics[{}]: fetch already in flight, coalescing", track_id);
                return;
            }
        }

        let client = Arc::clone(&self.client);
        let cache = self.cache.clone();
        let events = self.events.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let track_id = track_id.to_string();
        thread::spawn(move || {
            let outcome = match client.fetch_lyrics(&track_id) {
                Ok(body) => {
                    let fresh = LyricsOutcome::Classified(classifier::classify(body.as_deref()));
                    if cache.put_if_absent(&track_id, fresh.clone()) {
                        fresh
                    } else {
                        // Lost the first-writer race; the stored value is
                        // the session's answer for this id.
                        cache.get(&track_id).unwrap_or(fresh)
                    }
                }
                Err(error) => LyricsOutcome::Failed(error.to_string()),
            };
            in_flight
                .lock()
                .expect("in-flight set lock poisoned")
                .remove(&track_id);
            let _ = events.send(ProbeEvent::LyricsCompleted { track_id, outcome });
        });
    }
}
