//! Configuration management for repolift
//!
//! Settings are read through a [`ConfigSource`] so the pipeline never touches the
//! process environment directly. Production code uses [`EnvConfigSource`]; tests
//! use [`MapConfigSource`].
//!
//! # Environment Variables
//!
//! - `REPOLIFT_SCRATCH_ROOT`: directory all checkouts must live under - default: system temp dir + "repolift"
//! - `REPOLIFT_MAX_REPO_SIZE_MB`: size ceiling for a checkout - default: "500"
//! - `REPOLIFT_SOURCE_SCAN_DEPTH`: depth of the source scan for file-based storage - default: "3"
//! - `REPOLIFT_REQUIRED_PLACEHOLDER`: value written for required variables without a default - default: "CHANGE_ME_REQUIRED"
//! - `REPOLIFT_BASE_DOMAIN`: domain used when generating application addresses - default: "localhost"
//! - `REPOLIFT_LOG_LEVEL` / `REPOLIFT_LOG_JSON`: see [`crate::util::logging`]

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_MAX_REPO_SIZE_MB: u64 = 500;
const DEFAULT_SOURCE_SCAN_DEPTH: usize = 3;
const DEFAULT_REQUIRED_PLACEHOLDER: &str = "CHANGE_ME_REQUIRED";
const DEFAULT_BASE_DOMAIN: &str = "localhost";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Key/value lookup for configuration settings
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed settings, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn parse_field<T: std::str::FromStr>(
    source: &dyn ConfigSource,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match source.get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Settings for the analysis phase
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Every analyzed checkout must resolve inside this directory
    pub scratch_root: PathBuf,
    pub max_repo_size_bytes: u64,
    /// How deep the source scan for file-based storage descends
    pub source_scan_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scratch_root: env::temp_dir().join("repolift"),
            max_repo_size_bytes: DEFAULT_MAX_REPO_SIZE_MB * 1024 * 1024,
            source_scan_depth: DEFAULT_SOURCE_SCAN_DEPTH,
        }
    }
}

impl AnalyzerConfig {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            ..Default::default()
        }
    }

    /// Load settings from `source`, falling back to defaults for missing keys
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let scratch_root = source
            .get("REPOLIFT_SCRATCH_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.scratch_root);
        let max_repo_size_mb =
            parse_field(source, "REPOLIFT_MAX_REPO_SIZE_MB", DEFAULT_MAX_REPO_SIZE_MB)?;
        let source_scan_depth =
            parse_field(source, "REPOLIFT_SOURCE_SCAN_DEPTH", DEFAULT_SOURCE_SCAN_DEPTH)?;

        let config = Self {
            scratch_root,
            max_repo_size_bytes: max_repo_size_mb * 1024 * 1024,
            source_scan_depth,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvConfigSource)
    }

    pub fn with_max_repo_size_bytes(mut self, max_repo_size_bytes: u64) -> Self {
        self.max_repo_size_bytes = max_repo_size_bytes;
        self
    }

    pub fn with_source_scan_depth(mut self, source_scan_depth: usize) -> Self {
        self.source_scan_depth = source_scan_depth;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_repo_size_bytes == 0 {
            return Err(ConfigError::ValidationFailed(
                "max repository size must be greater than 0".to_string(),
            ));
        }
        if self.source_scan_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "source scan depth must be greater than 0".to_string(),
            ));
        }
        if self.scratch_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "scratch root must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the provisioning phase
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub required_placeholder: String,
    pub base_domain: String,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            required_placeholder: DEFAULT_REQUIRED_PLACEHOLDER.to_string(),
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
        }
    }
}

impl ProvisionerConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let config = Self {
            required_placeholder: source
                .get("REPOLIFT_REQUIRED_PLACEHOLDER")
                .unwrap_or_else(|| DEFAULT_REQUIRED_PLACEHOLDER.to_string()),
            base_domain: source
                .get("REPOLIFT_BASE_DOMAIN")
                .unwrap_or_else(|| DEFAULT_BASE_DOMAIN.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvConfigSource)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_placeholder.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "required placeholder must not be empty".to_string(),
            ));
        }
        if self.base_domain.contains("://") || self.base_domain.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "base domain must be a bare host name, got {}",
                self.base_domain
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_analyzer_defaults() {
        let config = AnalyzerConfig::from_source(&MapConfigSource::new()).unwrap();
        assert_eq!(config.max_repo_size_bytes, 500 * 1024 * 1024);
        assert_eq!(config.source_scan_depth, 3);
        assert!(config.scratch_root.ends_with("repolift"));
    }

    #[test]
    fn test_analyzer_overrides() {
        let source = MapConfigSource::new()
            .with("REPOLIFT_SCRATCH_ROOT", "/srv/checkouts")
            .with("REPOLIFT_MAX_REPO_SIZE_MB", "10")
            .with("REPOLIFT_SOURCE_SCAN_DEPTH", "5");

        let config = AnalyzerConfig::from_source(&source).unwrap();
        assert_eq!(config.scratch_root, PathBuf::from("/srv/checkouts"));
        assert_eq!(config.max_repo_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.source_scan_depth, 5);
    }

    #[test]
    fn test_invalid_number_is_parse_error() {
        let source = MapConfigSource::new().with("REPOLIFT_MAX_REPO_SIZE_MB", "lots");

        match AnalyzerConfig::from_source(&source) {
            Err(ConfigError::ParseError { field, .. }) => {
                assert_eq!(field, "REPOLIFT_MAX_REPO_SIZE_MB")
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let source = MapConfigSource::new().with("REPOLIFT_MAX_REPO_SIZE_MB", "0");
        assert!(matches!(
            AnalyzerConfig::from_source(&source),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_builder_pattern() {
        let config = AnalyzerConfig::new("/scratch")
            .with_max_repo_size_bytes(1024)
            .with_source_scan_depth(1);

        assert_eq!(config.scratch_root, PathBuf::from("/scratch"));
        assert_eq!(config.max_repo_size_bytes, 1024);
        assert_eq!(config.source_scan_depth, 1);
    }

    #[test]
    fn test_provisioner_rejects_url_as_domain() {
        let source = MapConfigSource::new().with("REPOLIFT_BASE_DOMAIN", "https://example.com");
        assert!(ProvisionerConfig::from_source(&source).is_err());
    }

    #[test]
    #[serial]
    fn test_env_source_reads_process_environment() {
        env::set_var("REPOLIFT_REQUIRED_PLACEHOLDER", "FILL_ME_IN");
        env::set_var("REPOLIFT_BASE_DOMAIN", "apps.example.com");

        let config = ProvisionerConfig::from_env().unwrap();
        assert_eq!(config.required_placeholder, "FILL_ME_IN");
        assert_eq!(config.base_domain, "apps.example.com");

        env::remove_var("REPOLIFT_REQUIRED_PLACEHOLDER");
        env::remove_var("REPOLIFT_BASE_DOMAIN");
    }

    #[test]
    #[serial]
    fn test_env_source_ignores_blank_values() {
        env::set_var("REPOLIFT_SOURCE_SCAN_DEPTH", "  ");
        assert_eq!(EnvConfigSource.get("REPOLIFT_SOURCE_SCAN_DEPTH"), None);
        env::remove_var("REPOLIFT_SOURCE_SCAN_DEPTH");
    }
}
