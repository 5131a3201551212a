//! Shared credentials file (`~/.aws/credentials`)
//!
//! Reading decodes every named section into a [`Profile`]. Writing
//! regenerates the whole file from a [`ProfileSet`]; it never patches a
//! single key in place.

use ini::{EscapePolicy, Ini, ParseOption, Properties, WriteOption};
use std::collections::{BTreeMap, btree_map::Entry};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::types::{Credential, Profile, ProfileSet, Source};
use crate::error::{CloudkeyError, Result};

pub const ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
pub const SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";
pub const SESSION_TOKEN_KEY: &str = "aws_session_token";

/// Handle on a credentials file at a fixed path
#[derive(Debug, Clone)]
pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read all profiles, marking `current` as the current one.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read(&self, current: Option<&str>) -> Result<Option<Vec<Profile>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "Credentials file not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        parse(&content, current)
            .map(Some)
            .map_err(|message| CloudkeyError::CredentialsFile {
                path: self.path.display().to_string(),
                message,
            })
    }

    /// Replace the file content with the `ConfigFile` profiles of `profiles`.
    ///
    /// The new content goes to a temporary file in the same directory which
    /// is then renamed over the old one.
    pub fn write(&self, profiles: &ProfileSet) -> Result<()> {
        let content = render(profiles)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = ?self.path, profiles = profiles.len(), "Wrote credentials file");
        Ok(())
    }
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

fn is_credential_key(key: &str) -> bool {
    matches!(
        key,
        ACCESS_KEY_ID_KEY | SECRET_ACCESS_KEY_KEY | SESSION_TOKEN_KEY
    )
}

/// Decode credentials file content into profiles sorted by name
pub fn parse(content: &str, current: Option<&str>) -> std::result::Result<Vec<Profile>, String> {
    let ini = Ini::load_from_str_opt(content, parse_options()).map_err(|e| e.to_string())?;
    let mut profiles: BTreeMap<String, Profile> = BTreeMap::new();

    for (section, properties) in ini.iter() {
        let Some(name) = section else {
            continue;
        };

        let access_key_id = properties.get(ACCESS_KEY_ID_KEY);
        let secret_access_key = properties.get(SECRET_ACCESS_KEY_KEY);
        let cred = Credential::from_parts(
            access_key_id,
            secret_access_key,
            properties.get(SESSION_TOKEN_KEY),
        );
        if cred.is_empty() && (access_key_id.is_some() || secret_access_key.is_some()) {
            warn!(
                profile = name,
                "Profile has an incomplete access key pair, ignoring its credential"
            );
        }

        // undecoded credential keys stay as plain settings
        let settings: BTreeMap<String, String> = properties
            .iter()
            .filter(|(key, _)| cred.is_empty() || !is_credential_key(key))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let profile = Profile::from_config_file(name, cred, current == Some(name))
            .with_settings(settings);

        match profiles.entry(name.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(profile);
            }
            Entry::Occupied(mut entry) => {
                warn!(profile = name, "Duplicate profile section, the last one wins");
                entry.insert(profile);
            }
        }
    }

    Ok(profiles.into_values().collect())
}

/// Encode the `ConfigFile` profiles of `profiles` as credentials file content
pub fn render(profiles: &ProfileSet) -> Result<String> {
    let mut ini = Ini::new();

    for profile in profiles.iter().filter(|p| p.source == Source::ConfigFile) {
        let cred = &profile.cred;
        let section = ini
            .entry(Some(profile.name.clone()))
            .or_insert(Properties::new());

        if cred.is_complete() {
            section.insert(ACCESS_KEY_ID_KEY, cred.access_key_id.as_str());
            section.insert(SECRET_ACCESS_KEY_KEY, cred.secret_access_key.as_str());
            if let Some(token) = cred.session_token() {
                section.insert(SESSION_TOKEN_KEY, token);
            }
        }
        for (key, value) in &profile.settings {
            if cred.is_complete() && is_credential_key(key) {
                continue;
            }
            section.insert(key.as_str(), value.as_str());
        }
    }

    let options = WriteOption {
        escape_policy: EscapePolicy::Nothing,
        kv_separator: " = ",
        ..Default::default()
    };
    let mut buffer = Vec::new();
    ini.write_to_opt(&mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| CloudkeyError::Config(e.to_string()))
}
