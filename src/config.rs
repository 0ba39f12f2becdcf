//! Persistent probe configuration model and defaults.

use log::{info, warn};

/// Default proxy endpoint fronting the catalog service. API keys are held
/// server-side by the proxy, so the probe itself carries no credentials.
pub const DEFAULT_BASE_URL: &str = "https://mletras-smart-proxy.belicongroup.workers.dev";

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ProbeConfig {
    #[serde(default)]
    /// Upstream catalog endpoint and HTTP timeouts.
    pub catalog: CatalogConfig,
    #[serde(default)]
    /// Search result filtering policy.
    pub search: SearchConfig,
    #[serde(default)]
    /// Consumer loop behavior.
    pub consumer: ConsumerConfig,
}

/// Upstream endpoint preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
}

/// Filtering applied to successful search results before they surface.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SearchConfig {
    /// Keep tracks the catalog flags as having no lyrics.
    #[serde(default)]
    pub include_untagged: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Consumer loop preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ConsumerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_io_timeout_secs() -> u64 {
    7
}

fn default_max_results() -> usize {
    20
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            io_timeout_secs: default_io_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_untagged: false,
            max_results: default_max_results(),
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Clamps configuration values into safe operating ranges.
pub fn sanitize_config(config: ProbeConfig) -> ProbeConfig {
    let trimmed_base_url = config.catalog.base_url.trim().trim_end_matches('/');
    let base_url = if trimmed_base_url.is_empty() {
        default_base_url()
    } else {
        trimmed_base_url.to_string()
    };

    ProbeConfig {
        catalog: CatalogConfig {
            base_url,
            connect_timeout_secs: config.catalog.connect_timeout_secs.clamp(1, 60),
            io_timeout_secs: config.catalog.io_timeout_secs.clamp(1, 120),
        },
        search: SearchConfig {
            include_untagged: config.search.include_untagged,
            max_results: config.search.max_results.clamp(1, 100),
        },
        consumer: ConsumerConfig {
            poll_interval_ms: config.consumer.poll_interval_ms.clamp(10, 5_000),
        },
    }
}

/// Loads the config file, creating it with defaults on first run. Any
/// filesystem or parse problem falls back to the built-in defaults.
pub fn load_or_create() -> ProbeConfig {
    let Some(config_root) = dirs::config_dir().map(|dir| dir.join("lyriprobe")) else {
        warn!("No config directory available on this system; using built-in defaults");
        return sanitize_config(ProbeConfig::default());
    };
    let config_file = config_root.join("config.toml");

    if !config_file.exists() {
        let default_config = ProbeConfig::default();
        info!(
            "Config file not found. Creating default config. path={}",
            config_file.display()
        );
        if let Err(error) = std::fs::create_dir_all(&config_root) {
            warn!(
                "Failed to create config directory {}: {}",
                config_root.display(),
                error
            );
            return sanitize_config(default_config);
        }
        match toml::to_string(&default_config) {
            Ok(config_text) => {
                if let Err(error) = std::fs::write(&config_file, config_text) {
                    warn!(
                        "Failed to persist default config to {}: {}",
                        config_file.display(),
                        error
                    );
                }
            }
            Err(error) => warn!("Failed to serialize default config: {}", error),
        }
        return sanitize_config(default_config);
    }

    let config_content = std::fs::read_to_string(&config_file).unwrap_or_default();
    let config = toml::from_str::<ProbeConfig>(&config_content).unwrap_or_else(|error| {
        warn!(
            "Failed to parse config at {}: {}. Using defaults.",
            config_file.display(),
            error
        );
        ProbeConfig::default()
    });
    sanitize_config(config)
}
