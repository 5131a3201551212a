//! Credential store adapter - persists a profile's new credential.

use std::sync::Arc;
use tracing::info;

use super::env::{ACCESS_KEY_ID_VAR, EnvStore, SECRET_ACCESS_KEY_VAR};
use super::file::CredentialsFile;
use super::types::{Credential, Profile, ProfileSet, Source};
use crate::config::StoreConfig;
use crate::error::Result;

/// Writes credentials back to the source a profile came from.
pub struct CredentialStore {
    file: CredentialsFile,
    env: Arc<dyn EnvStore>,
}

impl CredentialStore {
    pub fn new(config: &StoreConfig, env: Arc<dyn EnvStore>) -> Self {
        Self {
            file: CredentialsFile::new(config.credentials_path.clone()),
            env,
        }
    }

    /// Persist `cred` for `profile`, then update the in-memory profile.
    ///
    /// File profiles are written by regenerating the whole credentials file
    /// from every section currently in it. The profile is only updated once
    /// the write succeeded.
    pub fn update_credential(&self, profile: &mut Profile, cred: Credential) -> Result<()> {
        match profile.source {
            Source::EnvironmentVariable => {
                self.env.set(ACCESS_KEY_ID_VAR, &cred.access_key_id);
                self.env.set(SECRET_ACCESS_KEY_VAR, &cred.secret_access_key);
            }
            Source::ConfigFile => {
                let mut profiles = ProfileSet::new(self.file.read(None)?.unwrap_or_default());
                match profiles.find_mut(&profile.name) {
                    Some(existing) => existing.cred = cred.clone(),
                    None => profiles.insert(
                        Profile::from_config_file(profile.name.clone(), cred.clone(), false)
                            .with_settings(profile.settings.clone()),
                    ),
                }
                self.file.write(&profiles)?;
            }
        }

        info!(
            profile = profile.display_name(),
            source = %profile.source,
            access_key_id = %cred.access_key_id,
            "Stored credential"
        );
        profile.cred = cred;
        Ok(())
    }
}
