// Backend configuration
// Resolves the analysis backend's base URL from the CLI/env or the config file

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Environment variable read by the `--backend-url` flag
pub const BACKEND_URL_ENV: &str = "GHCAREER_BACKEND_URL";

/// Where the backend URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    CommandLine,
    ConfigFile,
}

impl SettingSource {
    pub fn name(&self) -> &str {
        match self {
            SettingSource::CommandLine => "command line / environment",
            SettingSource::ConfigFile => "config file",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: Url,
    pub source: SettingSource,
}

/// On-disk configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
}

impl ConfigFile {
    /// Load configuration from `path`; a missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Get the config file path
pub fn config_file_path() -> Result<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|dir| dir.join("ghcareer").join("config.json"))
        .ok_or_else(|| anyhow!("Could not determine config directory or home directory"))
}

/// Parse and check a backend base URL
pub fn parse_backend_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid backend URL: {}", raw))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Backend URL must use http or https: {}", url);
    }
    if url.cannot_be_a_base() {
        bail!("Backend URL cannot take path segments: {}", url);
    }
    Ok(url)
}

/// Resolve settings: CLI flag (or its env var) first, then the config file.
/// Having neither is a deployment error.
pub fn resolve(cli_backend_url: Option<&str>, config_path: &Path) -> Result<Settings> {
    if let Some(raw) = cli_backend_url {
        debug!("Backend URL from command line: {}", raw);
        return Ok(Settings {
            backend_url: parse_backend_url(raw)?,
            source: SettingSource::CommandLine,
        });
    }

    let file = ConfigFile::load_from(config_path)?;
    match file.backend_url {
        Some(raw) => {
            debug!("Backend URL from {}: {}", config_path.display(), raw);
            Ok(Settings {
                backend_url: parse_backend_url(&raw)?,
                source: SettingSource::ConfigFile,
            })
        }
        None => bail!(
            "No backend URL configured. Pass --backend-url, set {}, or run 'ghcareer config set <URL>'.",
            BACKEND_URL_ENV
        ),
    }
}

/// Validate and persist the backend URL
pub fn set_backend_url(raw: &str, config_path: &Path) -> Result<Url> {
    let url = parse_backend_url(raw)?;
    let mut file = ConfigFile::load_from(config_path)?;
    file.backend_url = Some(url.to_string());
    file.save_to(config_path)?;
    Ok(url)
}
