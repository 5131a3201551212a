//! Path utilities for AWS and cloudkey directory resolution.

use std::path::PathBuf;

use crate::error::{CloudkeyError, Result};

const AWS_DIR: &str = ".aws";
const CREDENTIALS_FILE: &str = "credentials";
const CLOUDKEY_DIR: &str = "cloudkey";
const CONFIG_FILE: &str = "config.toml";
const LOGS_DIR: &str = "logs";

/// Resolve the AWS configuration directory: ~/.aws/
pub fn aws_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(AWS_DIR))
        .ok_or_else(|| CloudkeyError::Config("Failed to determine home directory".to_string()))
}

/// Get the shared credentials file path: ~/.aws/credentials
pub fn default_credentials_path() -> Result<PathBuf> {
    Ok(aws_dir()?.join(CREDENTIALS_FILE))
}

/// Get the cloudkey config file path: ~/.config/cloudkey/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CLOUDKEY_DIR).join(CONFIG_FILE))
}

/// Get the default logs directory: ~/.local/share/cloudkey/logs/
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(CLOUDKEY_DIR).join(LOGS_DIR))
}
