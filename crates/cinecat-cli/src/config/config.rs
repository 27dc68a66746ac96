//! `AppConfig` struct and TOML read/write.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cinecat_api::tmdb::{Credential, QueryBuilder, TmdbClient};
use cinecat_store::{AppDir, resolve_app_dir};
use serde::{Deserialize, Serialize};

/// User-Agent sent with every TMDB request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB request settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// TMDB request configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbConfig {
    /// Response language (e.g. `es-ES`).
    #[serde(default = "default_language")]
    pub language: String,
    /// ISO 3166-1 region for now-playing/upcoming listings and certifications.
    #[serde(default = "default_region")]
    pub region: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API base URL override (defaults to the public v3 endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_language() -> String {
    String::from("es-ES")
}

fn default_region() -> String {
    String::from("AR")
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            region: default_region(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

impl TmdbConfig {
    /// Builds the query builder for these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is set but is not a valid URL.
    pub fn queries(&self) -> Result<QueryBuilder> {
        let builder = match self.base_url.as_deref() {
            Some(url) => QueryBuilder::parse(url)?,
            None => QueryBuilder::public()?,
        };
        Ok(builder
            .language(self.language.as_str())
            .region(self.region.as_str()))
    }

    /// Per-request timeout; never zero.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Builds a TMDB client authenticated with `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client fails to build.
    pub fn build_client(&self, credential: Credential) -> Result<TmdbClient> {
        TmdbClient::builder()
            .queries(self.queries()?)
            .credential(credential)
            .user_agent(USER_AGENT)
            .timeout(self.timeout())
            .build()
            .context("failed to build TMDB client")
    }
}

impl AppConfig {
    /// File name of the config inside the config directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Resolves the config file path.
    ///
    /// With `dir` set the file lives in `{dir}`; otherwise in the per-user
    /// config directory (`$XDG_CONFIG_HOME/cinecat` or `~/.config/cinecat`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn locate(dir: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(resolve_app_dir(dir, AppDir::Config)?.join(Self::FILE_NAME))
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}
