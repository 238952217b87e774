//! Tool configuration module.
//!
//! Configuration is layered: environment variables override values from an
//! optional `album-ark.toml`, which overrides the built-in defaults. The
//! layering and the commented template printed by `album-ark gen-config` are
//! both handled by [confique](https://docs.rs/confique).
//!
//! ## Config File Location
//!
//! By default the file is read from the package root:
//!
//! ```text
//! package/
//! ├── album-ark.toml           # Optional; every key has an env override
//! ├── metadata.csv
//! └── images/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [ezid]
//! base_url = "https://ezid.cdlib.org"
//! target_pattern = "https://digital.ucdavis.edu/collection/{key}"
//! timeout_secs = 30
//! pause_ms = 1000
//! # shoulder, username, password: no defaults, see below
//!
//! [archive]
//! publisher = "UC Davis Library, Archives and Special Collections"
//! publisher_id = "http://id.loc.gov/authorities/names/no2008108707"
//! license = "http://rightsstatements.org/vocab/InC-NC/1.0/"
//! sd_date_published = "2025"
//! placeholder_ark = "ark:/87293/d3028pm2g"
//!
//! [subjects]
//! fast_base_url = "https://experimental.worldcat.org/fast"
//! timeout_secs = 10
//! ```
//!
//! ## Secrets
//!
//! The minting credentials and the shoulder have no default value. They are
//! expected to come from `EZID_USERNAME`, `EZID_PASSWORD` and `EZID_SHOULDER`
//! (the file works too, but keeps secrets on disk). They are only checked when
//! a mint is about to run, so `scaffold` and `describe` work without them.

use crate::mint::{Credentials, MintEndpoint};
use confique::Config;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    Load(#[from] confique::Error),
    #[error("Missing required setting {key} (set {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Placeholder substituted with the per-document key in `target_pattern`.
pub const TARGET_KEY_PLACEHOLDER: &str = "{key}";

/// Top-level configuration for `album-ark`.
#[derive(Config, Debug, Clone)]
pub struct AlbumConfig {
    /// Minting service (EZID) connection and pacing.
    #[config(nested)]
    pub ezid: EzidConfig,
    /// Archive-wide constants written into every descriptor document.
    #[config(nested)]
    pub archive: ArchiveConfig,
    /// Subject-heading label lookup.
    #[config(nested)]
    pub subjects: SubjectsConfig,
}

/// Minting service settings.
#[derive(Config, Debug, Clone)]
pub struct EzidConfig {
    /// Base URL of the minting service.
    #[config(env = "EZID_BASE_URL", default = "https://ezid.cdlib.org")]
    pub base_url: String,
    /// Namespace shoulder new identifiers are minted from, e.g. "ark:/87293/d3".
    #[config(env = "EZID_SHOULDER")]
    pub shoulder: Option<String>,
    /// Account name. Prefer the environment variable over the file.
    #[config(env = "EZID_USERNAME")]
    pub username: Option<String>,
    /// Account password. Prefer the environment variable over the file.
    #[config(env = "EZID_PASSWORD")]
    pub password: Option<String>,
    /// URL each minted identifier resolves to. `{key}` is replaced with the
    /// lowercased collection id or the document's file stem.
    #[config(
        env = "ALBUM_ARK_TARGET_PATTERN",
        default = "https://digital.ucdavis.edu/collection/{key}"
    )]
    pub target_pattern: String,
    /// Request timeout in seconds.
    #[config(env = "EZID_TIMEOUT_SECS", default = 30)]
    pub timeout_secs: u64,
    /// Pause between consecutive mint requests, in milliseconds.
    #[config(env = "EZID_PAUSE_MS", default = 1000)]
    pub pause_ms: u64,
}

/// Constants shared by the collection and item templates.
#[derive(Config, Debug, Clone)]
pub struct ArchiveConfig {
    /// Publishing institution, used for schema:publisher and schema:sdPublisher.
    #[config(default = "UC Davis Library, Archives and Special Collections")]
    pub publisher: String,
    /// Name-authority URI of the publishing institution.
    #[config(default = "http://id.loc.gov/authorities/names/no2008108707")]
    pub publisher_id: String,
    /// Rights statement URI for both content and structured data.
    #[config(default = "http://rightsstatements.org/vocab/InC-NC/1.0/")]
    pub license: String,
    /// Year the structured data is published (schema:sdDatePublished).
    #[config(default = "2025")]
    pub sd_date_published: String,
    /// Identifier written by `describe` until a real ARK is minted.
    #[config(default = "ark:/87293/d3028pm2g")]
    pub placeholder_ark: String,
}

/// FAST subject-heading lookup settings.
#[derive(Config, Debug, Clone)]
pub struct SubjectsConfig {
    /// Base URL of the FAST JSON service.
    #[config(env = "FAST_BASE_URL", default = "https://experimental.worldcat.org/fast")]
    pub fast_base_url: String,
    /// Lookup timeout in seconds.
    #[config(default = 10)]
    pub timeout_secs: u64,
}

impl AlbumConfig {
    /// Validate values that confique cannot check by type alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ezid.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ezid.base_url must not be empty".into(),
            ));
        }
        if !self.ezid.target_pattern.contains(TARGET_KEY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "ezid.target_pattern must contain {TARGET_KEY_PLACEHOLDER}"
            )));
        }
        if self.ezid.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "ezid.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.subjects.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "subjects.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl EzidConfig {
    /// Resolve the endpoint and credentials needed to mint.
    ///
    /// Fails with [`ConfigError::Missing`] for the first unset secret, so the
    /// operator sees which variable to export.
    pub fn endpoint(&self) -> Result<MintEndpoint, ConfigError> {
        let shoulder = required(&self.shoulder, "ezid.shoulder", "EZID_SHOULDER")?;
        let username = required(&self.username, "ezid.username", "EZID_USERNAME")?;
        let password = required(&self.password, "ezid.password", "EZID_PASSWORD")?;
        Ok(MintEndpoint {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            shoulder,
            credentials: Credentials::new(username, password),
        })
    }

    /// Endpoint for dry runs: never used to send a request, so unset secrets
    /// are tolerated and left blank.
    pub fn preview_endpoint(&self) -> MintEndpoint {
        self.endpoint().unwrap_or_else(|_| MintEndpoint {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            shoulder: self.shoulder.clone().unwrap_or_default(),
            credentials: Credentials::new("", ""),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Fill `target_pattern` with a document key.
    pub fn target_url(&self, key: &str) -> String {
        expand_target(&self.target_pattern, key)
    }
}

/// Substitute `key` for every `{key}` in a target URL pattern.
pub fn expand_target(pattern: &str, key: &str) -> String {
    pattern.replace(TARGET_KEY_PLACEHOLDER, key)
}

fn required(
    value: &Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    // Blank counts as unset, but a set value is passed through untrimmed.
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .ok_or(ConfigError::Missing { key, env })
}

/// Load configuration: environment over `path` (if it exists) over defaults.
pub fn load_config(path: &Path) -> Result<AlbumConfig, ConfigError> {
    let config = AlbumConfig::builder().env().file(path).load()?;
    config.validate()?;
    Ok(config)
}

/// Returns the commented TOML template with every key and its default.
///
/// Used by the `gen-config` CLI command.
pub fn config_template() -> String {
    confique::toml::template::<AlbumConfig>(confique::toml::FormatOptions::default())
}
