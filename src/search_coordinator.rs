//! Search dispatch with generation-based staleness handling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use log::{debug, info};

use crate::cache::ResultCache;
use crate::catalog::CatalogClient;
use crate::protocol::{ProbeEvent, SearchOutcome, Track};

/// Filter policy applied to a successful search result before it surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SearchPolicy {
    /// Keep tracks the catalog flags as having no lyrics.
    pub include_untagged: bool,
    /// Cap on surfaced tracks, catalog order preserved.
    pub max_results: usize,
}

/// Dispatches one background worker per search and discards completions
/// that a newer search has superseded. There is no true cancellation; a
/// slow worker simply finds its generation stale and drops its result.
pub struct SearchCoordinator {
    client: Arc<dyn CatalogClient>,
    cache: ResultCache,
    events: Sender<ProbeEvent>,
    generation: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        cache: ResultCache,
        events: Sender<ProbeEvent>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            client,
            cache,
            events,
            generation,
        }
    }

    /// Starts a new search session under the given filter policy. The
    /// previous session's results become stale immediately and its cache
    /// entries are dropped up front.
    pub fn start_search(&self, query: &str, policy: SearchPolicy) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cache.clear();
        info!("Search[{}]: dispatching query '{}'", generation, query);

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let current_generation = Arc::clone(&self.generation);
        let query = query.to_string();
        thread::spawn(move || {
            let outcome = match client.search_tracks(&query) {
                Ok(tracks) => SearchOutcome::Success(Self::apply_policy(tracks, policy)),
                Err(error) => SearchOutcome::Failure(error.to_string()),
            };
            // Last search wins: a completion for a superseded generation
            // must never reach the channel.
            if current_generation.load(Ordering::SeqCst) != generation {
                debug!("Search[{}]: discarding stale completion", generation);
                return;
            }
            let _ = events.send(ProbeEvent::SearchCompleted {
                generation,
                outcome,
            });
        });
    }

    fn apply_policy(tracks: Vec<Track>, policy: SearchPolicy) -> Vec<Track> {
        let mut kept: Vec<Track> = tracks
            .into_iter()
            .filter(|track| track.has_lyrics_flag || policy.include_untagged)
            .collect();
        kept.truncate(policy.max_results);
        kept
    }
}
