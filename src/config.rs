use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::models::SourceDescriptor;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN is missing. Please check your environment variables.")]
    MissingToken,
    #[error("Failed to read sources file {path}: {message}")]
    SourcesFile { path: String, message: String },
    #[error("Invalid sources list: {0}")]
    InvalidSources(String),
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // GitHub
    pub github_token: String,
    pub gist_id: Option<String>,
    pub github_api_url: String,

    // Fetching
    pub fetch_timeout_ms: u64,
    pub max_playlist_size_mb: usize,
    pub user_agent: String,

    // Output
    pub output_dir: PathBuf,
    pub save_local: bool,

    pub sources: Vec<SourceDescriptor>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token = var("GITHUB_TOKEN").ok_or(ConfigError::MissingToken)?;

        let sources = match var("SOURCES_FILE") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::SourcesFile {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                load_sources(&raw)?
            }
            None => default_sources(),
        };

        Ok(Self {
            github_token,
            gist_id: var("GIST_ID").map(|id| id.trim().to_string()),
            github_api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string()),

            fetch_timeout_ms: var("FETCH_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000), // 30 seconds

            max_playlist_size_mb: var("MAX_PLAYLIST_SIZE_MB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),

            user_agent: var("USER_AGENT").unwrap_or_else(|| {
                format!("playlist-aggregator/{}", env!("CARGO_PKG_VERSION"))
            }),

            output_dir: var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),

            save_local: var("SAVE_LOCAL")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),

            sources,
        })
    }
}

/// Parse a JSON sources list: `[{"label": "...", "url": "..."}]`
pub fn load_sources(raw: &str) -> Result<Vec<SourceDescriptor>, ConfigError> {
    let sources: Vec<SourceDescriptor> =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidSources(e.to_string()))?;

    let mut labels = HashSet::new();
    for source in &sources {
        if source.label.trim().is_empty() {
            return Err(ConfigError::InvalidSources(format!(
                "empty label for {}",
                source.url
            )));
        }
        if !labels.insert(source.label.as_str()) {
            return Err(ConfigError::InvalidSources(format!(
                "duplicate label '{}'",
                source.label
            )));
        }
        let scheme_ok = Url::parse(&source.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !scheme_ok {
            return Err(ConfigError::InvalidSources(format!(
                "'{}' has an invalid URL: {}",
                source.label, source.url
            )));
        }
    }

    Ok(sources)
}

/// Built-in source list, in processing order
pub fn default_sources() -> Vec<SourceDescriptor> {
    [
        ("Toffee", "https://raw.githubusercontent.com/byte-capsule/Toffee-Channels-Link-Headers/refs/heads/main/toffee_OTT_Navigator.m3u"),
        ("T-Sport", "https://raw.githubusercontent.com/byte-capsule/TSports-m3u8-Grabber/refs/heads/main/OTT_Navigator_Tspots_live.m3u"),
        ("CricHD VIP", "https://gist.githubusercontent.com/hridoy65/64a87bcbdd5825ab2c5c063621607f31/raw/crichdvip.m3u"),
        ("SonyLiv Live", "https://raw.githubusercontent.com/drmlive/sliv-live-events/refs/heads/main/sonyliv.m3u"),
        ("JadooBD IPTV", "https://playlist.nayeem-parvez.pw/jadoox.m3u"),
        ("FanCode Live", "https://raw.githubusercontent.com/byte-capsule/FanCode-Hls-Fetcher/refs/heads/main/Fancode_Live.m3u"),
        ("RabbitholeBD", "https://nayeem0.tech/rabbitXX/playlist.php"),
        ("SonyLiv BD", "https://playlist.nayeem-parvez.pw/Sonyx.m3u"),
        ("JioCinema", "https://raw.githubusercontent.com/khankimagi23221/okk-1/refs/heads/main/Jiocinema.m3u"),
        ("JioCinema Events", "https://raw.githubusercontent.com/alex4528/jevents/refs/heads/main/jevents_live.m3u"),
        ("Zee5", "https://raw.githubusercontent.com/khankimagi23221/okk-1/refs/heads/main/zee5.m3u"),
        ("Ayna", "https://api.sportzxtv.com/sportzx/aynaa.php"),
        ("JagoBD", "https://s1.sadman0.workers.dev/jagobd.m3u8"),
        ("BDCast", "https://raw.githubusercontent.com/nayeem086/playlists/main/bdcast.m3u"),
        ("BDIX", "https://playlist.nayeem-parvez.pw/bdix.m3u"),
        ("Voot", "https://fifabangladesh.live/VHOD/vootXranapk.m3u"),
        ("Star Sports", "https://playlist.nayeem-parvez.pw/starx.m3u"),
        ("HimelOP", "https://himel-op.top/himelop-premium/playlist-op.m3u"),
        ("Toffee Script", "https://bdiptv24.com/Toffeelive/kaya_app.php?route=getIPTVList"),
        ("DaddyHD Live", "https://raw.githubusercontent.com/dtankdempse/daddylive-m3u/refs/heads/main/vlc_playlist.m3u8"),
        ("DaddyHD Events", "https://raw.githubusercontent.com/stein-dev/iptvs/refs/heads/main/dlhd-events.m3u8"),
        ("Adult (DaddyHD)", "https://raw.githubusercontent.com/dtankdempse/daddylive-m3u/refs/heads/main/adult/vlc_playlist.m3u8"),
        ("MoveOnJoy", "https://bit.ly/moj-m3u8"),
        ("SportsLive", "https://raw.githubusercontent.com/steinxborg/iptvs/refs/heads/main/sportslive-channels.m3u8"),
        ("SportsLive Events", "https://raw.githubusercontent.com/steinxborg/iptvs/refs/heads/main/sportslive-events.m3u8"),
    ]
    .into_iter()
    .map(|(label, url)| SourceDescriptor::new(label, url))
    .collect()
}
