use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_GEOLOCATION_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum GlobalConfigError {
    #[error("missing required global config field: {0}")]
    MissingField(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Runtime mode of the process, taken from the `ENV` variable.
///
/// `Tests` relaxes the configure-once rule of the provider registry so test
/// suites can set it up repeatedly in one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Normal,
    Tests,
}

impl RunMode {
    pub fn is_tests(self) -> bool {
        matches!(self, RunMode::Tests)
    }
}

impl FromStr for RunMode {
    type Err = std::convert::Infallible;

    /// Anything other than `tests` is normal operation.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("tests") {
            Ok(RunMode::Tests)
        } else {
            Ok(RunMode::Normal)
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Normal => f.write_str("normal"),
            RunMode::Tests => f.write_str("tests"),
        }
    }
}

/// Final, merged configuration used by the running process.
///
/// Merge order: CLI/ENV > config file > defaults.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    /// Google Maps Platform API key.
    pub api_key: String,
    /// Optional outbound proxy for upstream egress.
    pub proxy: Option<String>,
    pub mode: RunMode,
    pub maps_base_url: String,
    pub geolocation_base_url: String,
}

impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &redact(&self.api_key))
            .field("proxy", &self.proxy)
            .field("mode", &self.mode)
            .field("maps_base_url", &self.maps_base_url)
            .field("geolocation_base_url", &self.geolocation_base_url)
            .finish()
    }
}

/// Keeps the last four characters of a secret for log lines.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Optional layer used for merging global config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlobalConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub proxy: Option<String>,
    pub mode: Option<RunMode>,
    pub maps_base_url: Option<String>,
    pub geolocation_base_url: Option<String>,
}

impl GlobalConfigPatch {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GlobalConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read(path).map_err(|source| GlobalConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| GlobalConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn overlay(&mut self, other: GlobalConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.maps_base_url.is_some() {
            self.maps_base_url = other.maps_base_url;
        }
        if other.geolocation_base_url.is_some() {
            self.geolocation_base_url = other.geolocation_base_url;
        }
    }

    pub fn into_config(self) -> Result<GlobalConfig, GlobalConfigError> {
        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(GlobalConfigError::MissingField("api_key"))?;
        Ok(GlobalConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(8080),
            api_key,
            proxy: self
                .proxy
                .map(|proxy| proxy.trim().to_string())
                .filter(|proxy| !proxy.is_empty()),
            mode: self.mode.unwrap_or_default(),
            maps_base_url: self
                .maps_base_url
                .unwrap_or_else(|| DEFAULT_MAPS_BASE_URL.to_string()),
            geolocation_base_url: self
                .geolocation_base_url
                .unwrap_or_else(|| DEFAULT_GEOLOCATION_BASE_URL.to_string()),
        })
    }
}

impl From<GlobalConfig> for GlobalConfigPatch {
    fn from(value: GlobalConfig) -> Self {
        Self {
            host: Some(value.host),
            port: Some(value.port),
            api_key: Some(value.api_key),
            proxy: value.proxy,
            mode: Some(value.mode),
            maps_base_url: Some(value.maps_base_url),
            geolocation_base_url: Some(value.geolocation_base_url),
        }
    }
}
