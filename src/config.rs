//! Bridge configuration.
//!
//! Loaded once at startup from a JSON file.  Broker defaults match a local
//! Mosquitto install; rules default to empty (and are then dropped by the
//! rule table as unused slots).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::RuleDefinition;

/// File name looked up next to the executable and in the system locations.
pub const CONFIG_FILENAME: &str = "schmitt-bridge.json";
/// System-wide configuration location.
pub const CONFIG_PATH: &str = "/etc/schmitt-bridge/schmitt-bridge.json";
/// Packaged default configuration.
pub const CONFIG_PATH_DEFAULT: &str = "/usr/share/schmitt-bridge/schmitt-bridge.json";

/// Broker connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    /// MQTT keep-alive interval (seconds).
    pub keepalive_secs: u64,
    /// Credentials are only sent when this is non-empty.
    pub username: String,
    pub password: String,
    pub client_id: String,
    /// Append a NUL byte to every outbound payload (C-string peers).
    pub nul_terminate_payloads: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 1883,
            keepalive_secs: 60,
            username: String::new(),
            password: String::new(),
            client_id: "schmitt-bridge".into(),
            nul_terminate_payloads: false,
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub broker: BrokerConfig,
    /// Rule definitions in file order.  Later entries override earlier ones
    /// with the same `topic_from`.
    pub rules: Vec<RuleDefinition>,
    /// Upper bound on tracked destination topics.  `None` = unbounded.
    pub state_capacity: Option<usize>,
}

impl BridgeConfig {
    /// Parse from a JSON string and validate.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_json(&text)
    }

    /// Range checks that would otherwise surface as broker or client
    /// failures.  Empty rule topics are not checked here; the rule table
    /// drops those.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker.host must not be empty"));
        }
        if self.broker.port == 0 {
            return Err(ConfigError::ValidationFailed("broker.port must be non-zero"));
        }
        if self.broker.keepalive_secs < 5 {
            return Err(ConfigError::ValidationFailed("broker.keepalive_secs must be at least 5"));
        }
        if self.broker.client_id.is_empty() {
            return Err(ConfigError::ValidationFailed("broker.client_id must not be empty"));
        }
        if self.state_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed("state_capacity must be at least 1"));
        }
        for rule in &self.rules {
            if rule.qos > 2 {
                return Err(ConfigError::ValidationFailed("rule qos must be 0, 1 or 2"));
            }
            if !rule.threshold.is_finite() {
                return Err(ConfigError::ValidationFailed("rule threshold must be finite"));
            }
        }
        Ok(())
    }
}

/// Pick the configuration file: the explicit path when given, otherwise the
/// first existing candidate from [`default_candidates`].
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let candidates = match explicit {
        Some(p) => vec![p.to_path_buf()],
        None => default_candidates(),
    };
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(ConfigError::NotFound(candidates))
}

/// Search order when no path is given on the command line.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(3);
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        out.push(dir.join(CONFIG_FILENAME));
    }
    out.push(PathBuf::from(CONFIG_PATH));
    out.push(PathBuf::from(CONFIG_PATH_DEFAULT));
    out
}
