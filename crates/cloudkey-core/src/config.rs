//! Runtime configuration passed into the resolver, rotation engine and
//! lookup fan-out.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::paths;
use crate::profile::env::{EnvStore, SHARED_CREDENTIALS_FILE_VAR};

/// Where the credential store adapter reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Shared credentials file
    pub credentials_path: PathBuf,
}

impl StoreConfig {
    /// Resolve the credentials file path.
    /// Priority: AWS_SHARED_CREDENTIALS_FILE > configured path > ~/.aws/credentials
    pub fn resolve(env: &dyn EnvStore, configured: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = env.get(SHARED_CREDENTIALS_FILE_VAR)
            && !path.trim().is_empty()
        {
            return Ok(Self {
                credentials_path: PathBuf::from(path),
            });
        }

        let credentials_path = match configured {
            Some(path) => path,
            None => paths::default_credentials_path()?,
        };
        Ok(Self { credentials_path })
    }
}

/// Timing of the rotation protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Fixed wait after issuing a key before it is used
    pub propagation_delay: Duration,
    /// Identity checks against the new key before giving up
    pub verify_attempts: u32,
    /// Wait between identity checks while the key is not yet valid
    pub verify_interval: Duration,
}

pub const DEFAULT_PROPAGATION_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_VERIFY_ATTEMPTS: u32 = 5;
pub const DEFAULT_VERIFY_INTERVAL: Duration = Duration::from_secs(5);

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            propagation_delay: DEFAULT_PROPAGATION_DELAY,
            verify_attempts: DEFAULT_VERIFY_ATTEMPTS,
            verify_interval: DEFAULT_VERIFY_INTERVAL,
        }
    }
}

/// Bounds of the listing fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Per-profile identity lookup timeout
    pub timeout: Duration,
}

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::env::MapEnv;

    #[test]
    fn test_store_config_env_override() {
        let env = MapEnv::from_pairs([(SHARED_CREDENTIALS_FILE_VAR, "/tmp/creds")]);
        let config = StoreConfig::resolve(&env, Some(PathBuf::from("/etc/ignored"))).unwrap();
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds"));
    }

    #[test]
    fn test_store_config_configured_path() {
        let env = MapEnv::new();
        let config = StoreConfig::resolve(&env, Some(PathBuf::from("/srv/creds"))).unwrap();
        assert_eq!(config.credentials_path, PathBuf::from("/srv/creds"));
    }

    #[test]
    fn test_rotation_defaults() {
        let config = RotationConfig::default();
        assert_eq!(config.propagation_delay, Duration::from_secs(15));
        assert_eq!(config.verify_attempts, 5);
    }
}
