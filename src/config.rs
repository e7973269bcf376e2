use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

const BASE_URL: &str = "ARTS_BASE_URL";
const START_LOCATION: &str = "ARTS_START_LOCATION";
const DOWNLOAD_DIR: &str = "ARTS_DOWNLOAD_DIR";
const MENU_FILE: &str = "ARTS_MENU_FILE";
const STREAMING: &str = "ARTS_STREAMING";
const SUCCESS_DWELL_MS: &str = "ARTS_SUCCESS_DWELL_MS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Menu targets resolve against this.
    pub base_url: Url,
    pub start_location: String,
    /// Save downloads here without asking. `None` opens a save dialog.
    pub download_dir: Option<PathBuf>,
    pub menu_file: Option<PathBuf>,
    pub streaming: bool,
    /// How long the progress modal lingers after a successful download.
    pub success_dwell: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            start_location: "/dashboard".to_string(),
            download_dir: None,
            menu_file: None,
            streaming: true,
            success_dwell: Duration::from_millis(600),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            base_url: try_load(&lookup, BASE_URL)?.unwrap_or(defaults.base_url),
            start_location: var(&lookup, START_LOCATION).unwrap_or(defaults.start_location),
            download_dir: var(&lookup, DOWNLOAD_DIR).map(PathBuf::from),
            menu_file: var(&lookup, MENU_FILE).map(PathBuf::from),
            streaming: match var(&lookup, STREAMING) {
                Some(value) => parse_flag(STREAMING, value)?,
                None => defaults.streaming,
            },
            success_dwell: try_load::<u64>(&lookup, SUCCESS_DWELL_MS)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.success_dwell),
        })
    }
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    match lookup(key).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            info!("{key} not set, using default");
            None
        }
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    var(lookup, key)
        .map(|value| {
            value.parse().map_err(|e: T::Err| {
                warn!("Invalid {key} value: {e}");
                ConfigError::Invalid {
                    key,
                    value,
                    reason: e.to_string(),
                }
            })
        })
        .transpose()
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}
