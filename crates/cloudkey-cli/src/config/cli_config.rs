//! CLI configuration file support
//!
//! Loads configuration from ~/.config/cloudkey/config.toml

use cloudkey_core::config::{
    DEFAULT_LOOKUP_TIMEOUT, DEFAULT_PROPAGATION_DELAY, DEFAULT_VERIFY_ATTEMPTS,
    DEFAULT_VERIFY_INTERVAL,
};
use cloudkey_core::{AwsSessionFactory, EnvStore, LookupConfig, RotationConfig, StoreConfig};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub rotation: RotationSection,
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub aws: AwsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Rotation timing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSection {
    /// Wait after creating a key before it is used
    pub propagation_delay_secs: Option<u64>,
    /// Identity checks against the new key before giving up
    pub verify_attempts: Option<u32>,
    /// Wait between identity checks
    pub verify_interval_secs: Option<u64>,
}

/// Listing fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSection {
    /// Per-profile identity lookup timeout
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSection {
    /// Region for STS and IAM calls
    pub region: Option<String>,
    /// Shared credentials file (AWS_SHARED_CREDENTIALS_FILE still wins)
    pub credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter when CLOUDKEY_LOG is unset
    pub level: Option<String>,
    /// Also write a daily log file
    #[serde(default)]
    pub file: bool,
    /// Log file directory (defaults to ~/.local/share/cloudkey/logs)
    pub directory: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from `path`, or the default path when none is given
    pub fn load(path: Option<&Path>) -> Self {
        Self::load_from_path(path.map(Path::to_path_buf).or_else(Self::default_path))
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the defaults. So does an unreadable or malformed
    /// one, after a warning.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "{} ignoring config file {}: {}",
                    "Warning:".yellow().bold(),
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        cloudkey_core::paths::config_path()
    }

    pub fn rotation(&self) -> RotationConfig {
        RotationConfig {
            propagation_delay: self
                .rotation
                .propagation_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PROPAGATION_DELAY),
            verify_attempts: self
                .rotation
                .verify_attempts
                .unwrap_or(DEFAULT_VERIFY_ATTEMPTS),
            verify_interval: self
                .rotation
                .verify_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_VERIFY_INTERVAL),
        }
    }

    pub fn lookup(&self) -> LookupConfig {
        LookupConfig {
            timeout: self
                .lookup
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
        }
    }

    pub fn store(&self, env: &dyn EnvStore) -> cloudkey_core::Result<StoreConfig> {
        StoreConfig::resolve(env, self.aws.credentials_file.clone())
    }

    pub fn session_factory(&self) -> AwsSessionFactory {
        AwsSessionFactory::with_region(self.aws.region.clone())
    }

    /// Directory for the log file, if file logging is enabled
    pub fn log_directory(&self) -> Option<PathBuf> {
        if !self.logging.file && self.logging.directory.is_none() {
            return None;
        }
        self.logging
            .directory
            .clone()
            .or_else(cloudkey_core::paths::logs_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::load(Some(temp_dir.path().join("absent.toml").as_path()));
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.rotation(), RotationConfig::default());
        assert_eq!(config.lookup(), LookupConfig::default());
        assert!(config.log_directory().is_none());
    }

    #[test]
    fn test_load_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[rotation]
propagation_delay_secs = 30
verify_attempts = 2

[lookup]
timeout_secs = 3

[aws]
region = "eu-west-1"
credentials_file = "/tmp/credentials"

[logging]
level = "info"
directory = "/tmp/cloudkey-logs"
"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(path.as_path()));
        let rotation = config.rotation();
        assert_eq!(rotation.propagation_delay, Duration::from_secs(30));
        assert_eq!(rotation.verify_attempts, 2);
        assert_eq!(rotation.verify_interval, DEFAULT_VERIFY_INTERVAL);
        assert_eq!(config.lookup().timeout, Duration::from_secs(3));
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.logging.level.as_deref(), Some("info"));
        assert_eq!(
            config.log_directory(),
            Some(PathBuf::from("/tmp/cloudkey-logs"))
        );
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[rotation\nverify_attempts = ").unwrap();

        assert_eq!(CliConfig::load(Some(path.as_path())), CliConfig::default());
    }

    #[test]
    fn test_configured_credentials_file() {
        let config = CliConfig {
            aws: AwsSection {
                credentials_file: Some(PathBuf::from("/tmp/credentials")),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = cloudkey_core::profile::MapEnv::new();
        let store = config.store(&env).unwrap();
        assert_eq!(store.credentials_path, PathBuf::from("/tmp/credentials"));
    }
}
