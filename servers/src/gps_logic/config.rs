use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lib_gps::retrieve::FeedConfig;

pub const DEFAULT_CONFIG_FILE: &str = "server_gps.conf";
pub const DEFAULT_FEED_URL: &str = "http://soiduplaan.tallinn.ee/gps.txt";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Vehicle GPS feed cache and JSON server", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "GPS_PORT", help = "Port to run bus-server on.")]
    pub port: Option<u16>,

    #[clap(long, env = "GPS_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "GPS_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "GPS_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "GPS_FEED_URL", help = "URL of the plaintext vehicle position feed.")]
    pub feed_url: Option<String>,

    #[clap(long, env = "GPS_REFRESH_INTERVAL_MS", help = "Milliseconds between feed refreshes.")]
    pub refresh_interval_ms: Option<u64>,

    #[clap(long, env = "GPS_FETCH_TIMEOUT_MS", help = "Timeout in milliseconds for one feed request.")]
    pub fetch_timeout_ms: Option<u64>,

    #[clap(long, env = "GPS_FETCH_RETRIES", help = "Retries on transient feed errors within one refresh.")]
    pub fetch_retries: Option<u32>,

    #[clap(long, env = "GPS_USER_AGENT", help = "User-Agent sent to the feed host.")]
    pub user_agent: Option<String>,
}

/// Fully resolved settings, every value present.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub feed_url: String,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub fetch_retries: u32,
    pub user_agent: String,
}

impl Settings {
    pub fn feed_config(&self) -> FeedConfig {
        let mut feed = FeedConfig::new(self.feed_url.clone());
        feed.timeout = self.fetch_timeout;
        feed.connect_timeout = feed.connect_timeout.min(self.fetch_timeout);
        feed.max_retries = self.fetch_retries;
        feed.user_agent = self.user_agent.clone();
        feed
    }
}

impl Config {
    pub fn defaults() -> Config {
        Config {
            port: Some(5000),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            feed_url: Some(DEFAULT_FEED_URL.to_string()),
            refresh_interval_ms: Some(1000),
            fetch_timeout_ms: Some(5000),
            fetch_retries: Some(0),
            user_agent: Some(concat!("bus-server/", env!("CARGO_PKG_VERSION")).to_string()),
            ..Default::default()
        }
    }

    // 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            feed_url: other.feed_url.or(self.feed_url),
            refresh_interval_ms: other.refresh_interval_ms.or(self.refresh_interval_ms),
            fetch_timeout_ms: other.fetch_timeout_ms.or(self.fetch_timeout_ms),
            fetch_retries: other.fetch_retries.or(self.fetch_retries),
            user_agent: other.user_agent.or(self.user_agent),
        }
    }

    /// Fills gaps from the defaults and converts to `Settings`.
    pub fn resolve(self) -> Settings {
        let c = Config::defaults().merge(self);
        Settings {
            port: c.port.unwrap_or(5000),
            log_dir: c.log_dir.unwrap_or_else(|| PathBuf::from("./logs")),
            log_level: c.log_level.unwrap_or_else(|| "info".to_string()),
            feed_url: c.feed_url.unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            // A zero period would make tokio's interval panic.
            refresh_interval: Duration::from_millis(c.refresh_interval_ms.unwrap_or(1000).max(1)),
            fetch_timeout: Duration::from_millis(c.fetch_timeout_ms.unwrap_or(5000).max(1)),
            fetch_retries: c.fetch_retries.unwrap_or(0),
            user_agent: c.user_agent.unwrap_or_default(),
        }
    }
}

/// Reads the JSON config file.
///
/// `Ok(None)` when the file does not exist. Read and parse failures come back
/// as a message because the logger is not installed yet at this point.
fn load_file(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }

    let config_str = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}. Falling back to other sources.", path.display(), e))?;

    serde_json::from_str::<Config>(&config_str)
        .map(Some)
        .map_err(|e| format!("Failed to parse config file {}: {}. Falling back to other sources.", path.display(), e))
}

/// Layers the configuration sources: file < environment/CLI.
pub fn layer(file_config: Option<Config>, cli_config: Config) -> Settings {
    let mut current = Config::default();
    if let Some(file_config) = file_config {
        current = current.merge(file_config);
    }
    current.merge(cli_config).resolve()
}

/// Settings plus the messages produced while loading them, to be logged once
/// logging is up.
pub struct LoadedConfig {
    pub settings: Settings,
    pub notices: Vec<(log::Level, String)>,
}

impl LoadedConfig {
    pub fn log_notices(&self) {
        for (level, message) in &self.notices {
            log::log!(*level, "{}", message);
        }
    }
}

fn load_from(config_file_path: &Path, cli_args: Config) -> LoadedConfig {
    let mut notices = Vec::new();

    let file_config = match load_file(config_file_path) {
        Ok(Some(file_config)) => Some(file_config),
        Ok(None) => {
            notices.push((
                log::Level::Info,
                format!(
                    "Config file not found at {}. Using defaults and environment/CLI variables.",
                    config_file_path.display()
                ),
            ));
            None
        }
        Err(message) => {
            // Also straight to stderr in case logging setup fails afterwards.
            eprintln!("{}", message);
            notices.push((log::Level::Warn, message));
            None
        }
    };

    LoadedConfig {
        settings: layer(file_config, cli_args),
        notices,
    }
}

pub fn load_config() -> LoadedConfig {
    // clap reads both CLI args and the GPS_* environment variables.
    let cli_args = Config::parse();

    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    load_from(&config_file_path, cli_args)
}
