use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::transport::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::api::{GeocodingRequest, HttpGet, ReqwestTransport};

const CONFIG_FILE_NAME: &str = "gmaps-geocode.toml";

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Defaults shared by every request, read from `gmaps-geocode.toml`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            key: None,
            language: None,
            region: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            verbose: false,
        }
    }
}

/// A config file on the search path that exists but could not be used
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedConfig {
    pub path: PathBuf,
    pub error: String,
}

impl FileConfig {
    /// First parseable config file on the search path, if any.
    ///
    /// Files that fail to read or parse are returned alongside so the
    /// caller can report them once logging is set up.
    pub fn load() -> (Option<Self>, Vec<SkippedConfig>) {
        Self::load_first(&get_config_paths())
    }

    /// Load an explicitly named config file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn load_first(paths: &[PathBuf]) -> (Option<Self>, Vec<SkippedConfig>) {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            let parsed = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|contents| toml::from_str(&contents).map_err(|e| e.to_string()));
            match parsed {
                Ok(config) => return (Some(config), skipped),
                Err(error) => skipped.push(SkippedConfig {
                    path: path.clone(),
                    error,
                }),
            }
        }
        (None, skipped)
    }

    pub fn transport(&self) -> Result<ReqwestTransport> {
        ReqwestTransport::new(&self.user_agent, Duration::from_secs(self.timeout_secs))
            .context("Failed to create HTTP client")
    }

    /// Fill request fields the caller left unset
    pub fn apply_defaults<T: HttpGet>(&self, request: &mut GeocodingRequest<T>) {
        if request.key.is_none() {
            request.key.clone_from(&self.key);
        }
        if request.language.is_none() {
            request.language.clone_from(&self.language);
        }
        if request.region.is_none() {
            request.region.clone_from(&self.region);
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths.push(PathBuf::from(format!(".{CONFIG_FILE_NAME}")));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("gmaps-geocode").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
    }

    paths
}
