//! Catalog service client seam and HTTP implementation.
//!
//! The pipeline consumes exactly two upstream operations. Both are blocking
//! and fallible; retries, timeouts beyond the agent defaults, and pagination
//! are not this layer's concern.

use std::io::Read;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::CatalogConfig;
use crate::protocol::Track;

const SEARCH_ENDPOINT: &str = "track.search";
const LYRICS_ENDPOINT: &str = "track.lyrics.get";
const PROBE_USER_AGENT: &str = "lyriprobe/0.1.0 (lyrics availability probe)";

/// Upstream failure taxonomy. Everything here is isolated to the request
/// that raised it; nothing is fatal to the process.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("catalog returned status {0}")]
    Api(u16),
    #[error("malformed catalog payload: {0}")]
    MalformedPayload(String),
}

/// The two catalog operations the pipeline consumes. Workers hold this as
/// `Arc<dyn CatalogClient>` so tests can substitute doubles.
pub trait CatalogClient: Send + Sync {
    /// Searches tracks by free-text query, in catalog ranking order.
    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError>;

    /// Fetches the raw lyrics body for one track id. `Ok(None)` means the
    /// response was well-formed but carried no lyrics field; classification
    /// downstream folds that into `Unknown`.
    fn fetch_lyrics(&self, track_id: &str) -> Result<Option<String>, CatalogError>;
}

/// Plain-GET client against the proxy fronting the catalog service. The
/// proxy handles API keys server-side, so requests carry no credentials.
pub struct HttpCatalogClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .timeout_read(Duration::from_secs(config.io_timeout_secs))
            .timeout_write(Duration::from_secs(config.io_timeout_secs))
            .build();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_json(&self, url: &str) -> Result<Value, CatalogError> {
        let response = self
            .agent
            .get(url)
            .set("User-Agent", PROBE_USER_AGENT)
            .set("Accept", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(code, _) => CatalogError::Api(code),
                other => CatalogError::Network(other.to_string()),
            })?;
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|error| CatalogError::Network(format!("failed to read response: {error}")))?;
        serde_json::from_str(&body)
            .map_err(|error| CatalogError::MalformedPayload(format!("invalid JSON: {error}")))
    }

    fn check_envelope(payload: &Value) -> Result<(), CatalogError> {
        let status = payload["message"]["header"]["status_code"]
            .as_u64()
            .ok_or_else(|| {
                CatalogError::MalformedPayload(
                    "response missing message.header.status_code".to_string(),
                )
            })?;
        if status != 200 {
            return Err(CatalogError::Api(status as u16));
        }
        Ok(())
    }

    /// Maps the search response body to track rows. Entries without a track
    /// id are skipped; a valid envelope with no track list is an empty
    /// result.
    fn parse_search_payload(payload: &Value) -> Result<Vec<Track>, CatalogError> {
        Self::check_envelope(payload)?;
        let Some(items) = payload["message"]["body"]["track_list"].as_array() else {
            return Ok(Vec::new());
        };

        let mut tracks = Vec::new();
        for item in items {
            let track = &item["track"];
            let id = match &track["track_id"] {
                Value::Number(number) => number.to_string(),
                Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
                _ => continue,
            };
            tracks.push(Track {
                id,
                title: track["track_name"]
                    .as_str()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                artist: track["artist_name"]
                    .as_str()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                has_lyrics_flag: track["has_lyrics"].as_i64() == Some(1),
            });
        }
        Ok(tracks)
    }

    /// Extracts the raw lyrics body. A valid envelope where the lyrics field
    /// is absent yields `None` rather than an error.
    fn parse_lyrics_payload(payload: &Value) -> Result<Option<String>, CatalogError> {
        Self::check_envelope(payload)?;
        Ok(payload["message"]["body"]["lyrics"]["lyrics_body"]
            .as_str()
            .map(str::to_string))
    }
}

impl CatalogClient for HttpCatalogClient {
    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let url = format!(
            "{}/{}?q_track={}&page=1",
            self.base_url,
            SEARCH_ENDPOINT,
            urlencoding::encode(query)
        );
        let payload = self.get_json(&url)?;
        Self::parse_search_payload(&payload)
    }

    fn fetch_lyrics(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
        let url = format!(
            "{}/{}?track_id={}",
            self.base_url,
            LYRICS_ENDPOINT,
            urlencoding::encode(track_id)
        );
        let payload = self.get_json(&url)?;
        Self::parse_lyrics_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, HttpCatalogClient};
    use serde_json::json;

    #[test]
    fn test_parse_search_payload_maps_track_rows() {
        let payload = json!({
            "message": {
                "header": { "status_code": 200 },
                "body": {
                    "track_list": [
                        { "track": {
                            "track_id": 123,
                            "track_name": " Despacito ",
                            "artist_name": "Luis Fonsi",
                            "has_lyrics": 1
                        } },
                        { "track": {
                            "track_name": "No id, skipped",
                            "artist_name": "Nobody",
                            "has_lyrics": 1
                        } },
                        { "track": {
                            "track_id": "456",
                            "track_name": "Interlude",
                            "artist_name": "Somebody",
                            "has_lyrics": 0
                        } }
                    ]
                }
            }
        });

        let tracks = HttpCatalogClient::parse_search_payload(&payload).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "123");
        assert_eq!(tracks[0].title, "Despacito");
        assert_eq!(tracks[0].artist, "Luis Fonsi");
        assert!(tracks[0].has_lyrics_flag);
        assert_eq!(tracks[1].id, "456");
        assert!(!tracks[1].has_lyrics_flag);
    }

    #[test]
    fn test_parse_search_payload_without_track_list_is_empty() {
        let payload = json!({
            "message": { "header": { "status_code": 200 }, "body": {} }
        });
        let tracks = HttpCatalogClient::parse_search_payload(&payload).unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_non_success_status_code_maps_to_api_error() {
        let payload = json!({
            "message": { "header": { "status_code": 401 }, "body": {} }
        });
        let result = HttpCatalogClient::parse_search_payload(&payload);
        assert!(matches!(result, Err(CatalogError::Api(401))));
    }

    #[test]
    fn test_missing_envelope_is_malformed_payload() {
        let payload = json!({ "unexpected": "shape" });
        let result = HttpCatalogClient::parse_lyrics_payload(&payload);
        assert!(matches!(result, Err(CatalogError::MalformedPayload(_))));
    }

    #[test]
    fn test_parse_lyrics_payload_extracts_body() {
        let payload = json!({
            "message": {
                "header": { "status_code": 200 },
                "body": { "lyrics": { "lyrics_body": "line one\nline two" } }
            }
        });
        let body = HttpCatalogClient::parse_lyrics_payload(&payload).unwrap();
        assert_eq!(body.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_parse_lyrics_payload_missing_field_is_none() {
        let payload = json!({
            "message": { "header": { "status_code": 200 }, "body": {} }
        });
        let body = HttpCatalogClient::parse_lyrics_payload(&payload).unwrap();
        assert_eq!(body, None);
    }
}
