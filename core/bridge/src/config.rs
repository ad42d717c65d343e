//! Bridge configuration (`~/.geo-presence/config.toml`).
//!
//! Every table and key is optional; a missing file means defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classifier::DEFAULT_GAME_HOST;
use crate::presence::PresenceConfig;
use crate::retry::RetryConfig;

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".geo-presence/config.toml";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 7777;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClassifierConfig {
    #[serde(default = "default_game_host")]
    pub game_host: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            game_host: default_game_host(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_game_host() -> String {
    DEFAULT_GAME_HOST.to_string()
}

pub fn default_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "Home directory not found".to_string())?;
    Ok(home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

pub fn load_config(path: Option<PathBuf>) -> Result<BridgeConfig, String> {
    let config_path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };

    if !config_path.exists() {
        return Ok(BridgeConfig::default());
    }

    parse_config_file(&config_path)
}

fn parse_config_file(path: &Path) -> Result<BridgeConfig, String> {
    let content = fs_err::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {}", path.display(), err))?;
    toml::from_str::<BridgeConfig>(&content)
        .map_err(|err| format!("Failed to parse config {}: {}", path.display(), err))
}
