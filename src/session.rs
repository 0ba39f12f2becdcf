//! Owned probe session wiring the pipeline to a polling consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::cache::ResultCache;
use crate::catalog::CatalogClient;
use crate::lyrics_fetcher::LyricsFetcher;
use crate::protocol::ProbeEvent;
use crate::search_coordinator::{SearchCoordinator, SearchPolicy};

/// One probe session: the generation counter, the per-session cache, both
/// worker front-ends, and the consumer end of the event channel. A new
/// search reuses the session by bumping the generation and clearing the
/// cache; nothing is shared implicitly across sessions.
pub struct ProbeSession {
    coordinator: SearchCoordinator,
    fetcher: LyricsFetcher,
    events: Receiver<ProbeEvent>,
    generation: Arc<AtomicU64>,
}

impl ProbeSession {
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let generation = Arc::new(AtomicU64::new(0));
        let cache = ResultCache::new();
        let coordinator = SearchCoordinator::new(
            Arc::clone(&client),
            cache.clone(),
            events_tx.clone(),
            Arc::clone(&generation),
        );
        let fetcher = LyricsFetcher::new(client, cache, events_tx);
        Self {
            coordinator,
            fetcher,
            events: events_rx,
            generation,
        }
    }

    /// Starts a search session under the given filter policy. Only this and
    /// `request_lyrics` mutate pipeline state.
    pub fn start_search(&self, query: &str, policy: SearchPolicy) {
        self.coordinator.start_search(query, policy);
    }

    pub fn request_lyrics(&self, track_id: &str) {
        self.fetcher.request_lyrics(track_id);
    }

    /// Non-blocking poll for the next pipeline event, in worker completion
    /// order. The consumer loop must never block on a worker.
    pub fn poll_event(&self) -> Option<ProbeEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Generation of the most recently started search, for the consumer's
    /// own staleness check on `SearchCompleted` events.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
