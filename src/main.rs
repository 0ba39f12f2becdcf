mod cache;
mod catalog;
mod classifier;
mod config;
mod lyrics_fetcher;
mod protocol;
mod search_coordinator;
mod session;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};

use catalog::HttpCatalogClient;
use protocol::{LyricsClassification, LyricsOutcome, ProbeEvent, SearchOutcome, Track};
use search_coordinator::SearchPolicy;
use session::ProbeSession;

/// Probe a song catalog for tracks whose lyrics are withheld behind the
/// commercial-use placeholder.
#[derive(Parser, Debug)]
#[command(name = "lyriprobe", version)]
struct Args {
    /// Search string to send to the catalog
    query: String,

    /// Max number of results to inspect (overrides config)
    #[arg(long)]
    limit: Option<usize>,

    /// Keep tracks the catalog flags as having no lyrics
    #[arg(long)]
    include_untagged: bool,

    /// Consumer poll cadence in milliseconds (overrides config)
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Catalog base URL (overrides config)
    #[arg(long, env = "LYRIPROBE_BASE_URL")]
    base_url: Option<String>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut clog = colog::default_builder();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    clog.filter(None, level);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let mut config = config::load_or_create();
    if let Some(limit) = args.limit {
        config.search.max_results = limit;
    }
    if args.include_untagged {
        config.search.include_untagged = true;
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        config.consumer.poll_interval_ms = poll_interval_ms;
    }
    if let Some(base_url) = args.base_url {
        config.catalog.base_url = base_url;
    }
    let config = config::sanitize_config(config);

    let client = Arc::new(HttpCatalogClient::new(&config.catalog));
    let session = ProbeSession::new(client);

    info!(
        "Querying catalog for '{}' (limit {})",
        args.query, config.search.max_results
    );
    session.start_search(
        &args.query,
        SearchPolicy {
            include_untagged: config.search.include_untagged,
            max_results: config.search.max_results,
        },
    );

    let poll_interval = Duration::from_millis(config.consumer.poll_interval_ms);
    let mut tracks: Vec<Track> = Vec::new();
    let mut outcomes: HashMap<String, LyricsOutcome> = HashMap::new();
    let mut pending = 0usize;
    let mut search_done = false;
    let mut search_error: Option<String> = None;

    loop {
        while let Some(event) = session.poll_event() {
            match event {
                ProbeEvent::SearchCompleted {
                    generation,
                    outcome,
                } => {
                    if generation != session.current_generation() {
                        // A newer search superseded this completion.
                        continue;
                    }
                    match outcome {
                        SearchOutcome::Success(found) => {
                            info!("Loaded {} track(s)", found.len());
                            for track in &found {
                                session.request_lyrics(&track.id);
                            }
                            pending = found.len();
                            tracks = found;
                        }
                        SearchOutcome::Failure(message) => {
                            search_error = Some(message);
                        }
                    }
                    search_done = true;
                }
                ProbeEvent::LyricsCompleted { track_id, outcome } => {
                    if outcomes.insert(track_id, outcome).is_none() {
                        pending = pending.saturating_sub(1);
                    }
                }
            }
        }
        if search_done && pending == 0 {
            break;
        }
        thread::sleep(poll_interval);
    }

    if let Some(message) = search_error {
        warn!("Search failed: {}", message);
        return Err(message.into());
    }
    if tracks.is_empty() {
        println!("No tracks returned. Try relaxing the query or raising the limit.");
        return Ok(());
    }

    print_report(&tracks, &outcomes);
    Ok(())
}

fn print_report(tracks: &[Track], outcomes: &HashMap<String, LyricsOutcome>) {
    let held = tracks
        .iter()
        .filter(|track| {
            matches!(
                outcomes.get(&track.id),
                Some(LyricsOutcome::Classified(LyricsClassification::CommercialHold))
            )
        })
        .count();

    for (index, track) in tracks.iter().enumerate() {
        let badge = match outcomes.get(&track.id) {
            Some(LyricsOutcome::Classified(LyricsClassification::Available(_))) => {
                "[LYRICS]".to_string()
            }
            Some(LyricsOutcome::Classified(LyricsClassification::CommercialHold)) => {
                "[COMMERCIAL HOLD]".to_string()
            }
            Some(LyricsOutcome::Classified(LyricsClassification::Unknown)) => {
                "[NO LYRICS]".to_string()
            }
            Some(LyricsOutcome::Failed(message)) => format!("[ERROR: {message}]"),
            None => "[PENDING]".to_string(),
        };
        println!(
            "{:>3}. {} {} / {} (id {})",
            index + 1,
            badge,
            track.title,
            track.artist,
            track.id
        );
        if let Some(LyricsOutcome::Classified(LyricsClassification::Available(text))) =
            outcomes.get(&track.id)
        {
            if let Some(first_line) = text.lines().next() {
                println!("        {}", first_line);
            }
        }
    }
    println!(
        "\n{} of {} track(s) returned the commercial-use placeholder.",
        held,
        tracks.len()
    );
}
