use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context};
use log::LevelFilter;
use serde::Deserialize;

use report_core::{ControllerConfig, Delivery, DEFAULT_POLL_INTERVAL};
use report_engine::{ClientSettings, DEFAULT_BASE_URL, DEFAULT_MAX_BYTES};

use crate::logging::LogDestination;

/// Path of an explicit configuration file.
pub const CONFIG_ENV: &str = "REPORT_CLIENT_CONFIG";
/// Overrides `server_url` from any file.
pub const SERVER_URL_ENV: &str = "REPORT_SERVER_URL";
/// Looked up in the working directory when no explicit path is set.
pub const DEFAULT_CONFIG_FILE: &str = "report_client.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum DeliveryMode {
    #[default]
    Fetch,
    OpenLocation,
}

impl From<DeliveryMode> for Delivery {
    fn from(mode: DeliveryMode) -> Self {
        match mode {
            DeliveryMode::Fetch => Delivery::Fetch,
            DeliveryMode::OpenLocation => Delivery::OpenLocation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub delivery: DeliveryMode,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_bytes: u64,
    pub output_dir: PathBuf,
    /// Program launched on every presented file or URL.
    pub opener: Option<String>,
    pub log: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            server_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            delivery: DeliveryMode::default(),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: None,
            max_bytes: DEFAULT_MAX_BYTES,
            output_dir: PathBuf::from("reports"),
            opener: None,
            log: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the environment, then resolves the configuration from it.
    pub fn load() -> anyhow::Result<Self> {
        Self::resolve(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var(SERVER_URL_ENV).ok(),
        )
    }

    /// Explicit file, else `./report_client.ron` if present, else defaults;
    /// a non-empty `server_url` override always wins.
    pub fn resolve(explicit: Option<PathBuf>, server_url: Option<String>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        if let Some(url) = server_url.map(|url| url.trim().to_string()) {
            if !url.is_empty() {
                config.server_url = url;
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.level()?;
        ensure!(
            config.poll_interval_ms > 0,
            "poll_interval_ms must be at least 1"
        );
        Ok(config)
    }

    pub fn level(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| anyhow!("unknown log level `{}`", self.log_level))
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            max_bytes: self.max_bytes,
            ..ClientSettings::default()
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            delivery: self.delivery.into(),
        }
    }
}
