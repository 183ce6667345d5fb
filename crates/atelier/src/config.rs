//! Optional atelier.toml configuration.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Configuration file structure (atelier.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub serve: ServeConfig,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServeConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_open")]
    pub open: bool,
    #[serde(default)]
    pub quiet: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            open: default_open(),
            quiet: false,
        }
    }
}

fn default_source() -> String {
    "src".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_open() -> bool {
    true
}

/// Load configuration from atelier.toml under `root` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(root: &Path) -> Result<ConfigFile> {
    let config_path = root.join("atelier.toml");
    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read atelier.toml: {}", e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse atelier.toml: {}", e))?;
        tracing::info!("Loaded config from atelier.toml");
        return Ok(config);
    }
    Ok(ConfigFile::default())
}
