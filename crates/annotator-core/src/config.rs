//! Configuration for the annotation tool

use annotator_gateway::{GatewayConfig, DEFAULT_MAX_TOKENS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "annotator.json";

/// Tool configuration
///
/// Every field is optional in the JSON file; missing fields take their
/// defaults. Credentials never live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backing file for annotation records
    pub data_file: PathBuf,

    /// Address the web surface listens on
    pub bind_addr: String,

    /// Output cap sent with every completion request
    pub max_tokens: u32,

    pub groq_base_url: String,

    pub openai_base_url: String,

    /// Completion request timeout (transport default when unset)
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        let gateway = GatewayConfig::default();
        Self {
            data_file: PathBuf::from("annotations.json"),
            bind_addr: "127.0.0.1:8501".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            groq_base_url: gateway.groq_base_url,
            openai_base_url: gateway.openai_base_url,
            request_timeout_secs: None,
        }
    }

    /// Load config from `path`, falling back to defaults when it is missing or invalid
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Config::new();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable config, using defaults");
                return Config::new();
            }
        };

        match serde_json::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Config::new()
            }
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            groq_base_url: self.groq_base_url.clone(),
            openai_base_url: self.openai_base_url.clone(),
            max_tokens: self.max_tokens,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
