//! Access key rotation engine
//!
//! Steps run strictly in order and every failure is terminal:
//!
//! 1. Resolve the profile (by name, or the current one)
//! 2. Establish a session from its credential
//! 3. Verify the caller is an IAM user
//! 4. Require exactly one key, the one in use
//! 5. Create the new key
//! 6. Write the new credential through the profile's store
//! 7. Wait for propagation and confirm the new key authenticates
//! 8. With the new session, deactivate and then delete the old key
//!
//! Nothing is rolled back once step 6 completed. A failure after that point
//! leaves two live keys with the local store pointing at the new one, and a
//! second run stops at step 4.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::RotationConfig;
use crate::error::{CloudkeyError, Result};
use crate::identity;
use crate::profile::{Credential, CredentialStore, Profile, ProfileResolver, Source};
use crate::remote::{AccessKeyInfo, KeyStatus, Session, SessionFactory};

/// Outcome of a successful rotation
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    /// Empty for the environment profile
    pub profile_name: String,
    pub source: Source,
    pub user_name: String,
    pub old_access_key_id: String,
    pub new_access_key_id: String,
    #[serde(skip)]
    pub new_credential: Credential,
}

pub struct RotationEngine {
    resolver: ProfileResolver,
    store: CredentialStore,
    sessions: Arc<dyn SessionFactory>,
    config: RotationConfig,
}

impl RotationEngine {
    pub fn new(
        resolver: ProfileResolver,
        store: CredentialStore,
        sessions: Arc<dyn SessionFactory>,
        config: RotationConfig,
    ) -> Self {
        Self {
            resolver,
            store,
            sessions,
            config,
        }
    }

    /// Rotate the access key behind `profile_name`, or behind the current
    /// profile when no name is given.
    pub async fn rotate(&self, profile_name: Option<&str>) -> Result<RotationReport> {
        let mut profile = match profile_name {
            Some(name) => self.resolver.resolve_by_name(name)?,
            None => self.resolver.resolve_current()?,
        };
        info!(
            profile = profile.display_name(),
            source = %profile.source,
            access_key_id = %profile.cred.access_key_id,
            "Rotating access key"
        );

        let session = self.sessions.establish(&profile.cred).await?;
        let user_name = identity::verify(&session).await?.user_name;

        let keys = session.keys().list_access_keys(&user_name).await?;
        let old_access_key_id = single_key_in_use(&user_name, &keys, &profile.cred)?;

        let new_key = session.keys().create_access_key(&user_name).await?;
        let new_access_key_id = new_key.access_key_id.clone();
        info!(user = %user_name, access_key_id = %new_access_key_id, "Created access key");

        let new_credential = Credential::from(new_key);
        self.swap_locally(&mut profile, new_credential.clone())?;

        let new_session = self.sessions.establish(&new_credential).await?;
        info!(
            delay_secs = self.config.propagation_delay.as_secs_f64(),
            "Waiting for the new key to propagate"
        );
        tokio::time::sleep(self.config.propagation_delay).await;
        self.confirm(&new_session).await?;

        self.retire(&new_session, &user_name, &old_access_key_id)
            .await?;

        info!(
            user = %user_name,
            old_access_key_id = %old_access_key_id,
            new_access_key_id = %new_access_key_id,
            "Rotation complete"
        );
        Ok(RotationReport {
            profile_name: profile.name,
            source: profile.source,
            user_name,
            old_access_key_id,
            new_access_key_id,
            new_credential,
        })
    }

    fn swap_locally(&self, profile: &mut Profile, credential: Credential) -> Result<()> {
        let access_key_id = credential.access_key_id.clone();
        self.store
            .update_credential(profile, credential)
            .inspect_err(|e| {
                error!(
                    access_key_id = %access_key_id,
                    error = %e,
                    "New access key was created but could not be stored"
                );
            })
    }

    /// Identity checks against the new key until it authenticates.
    async fn confirm(&self, session: &Session) -> Result<()> {
        let attempts = self.config.verify_attempts.max(1);
        let mut attempt = 1;

        loop {
            match identity::verify(session).await {
                Ok(_) => {
                    info!(attempt, "New access key confirmed");
                    return Ok(());
                }
                Err(e)
                    if attempt < attempts
                        && e.remote_code().is_some_and(|c| c.is_propagation_pending()) =>
                {
                    warn!(
                        attempt,
                        attempts,
                        error = %e,
                        "New access key not usable yet, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.config.verify_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn retire(&self, session: &Session, user_name: &str, access_key_id: &str) -> Result<()> {
        session
            .keys()
            .update_access_key(user_name, access_key_id, KeyStatus::Inactive)
            .await?;
        info!(user = %user_name, access_key_id = %access_key_id, "Deactivated old access key");

        session
            .keys()
            .delete_access_key(user_name, access_key_id)
            .await?;
        info!(user = %user_name, access_key_id = %access_key_id, "Deleted old access key");
        Ok(())
    }
}

/// The user must own exactly one key and it must be the one in `in_use`.
fn single_key_in_use(
    user_name: &str,
    keys: &[AccessKeyInfo],
    in_use: &Credential,
) -> Result<String> {
    match keys {
        [] => Err(CloudkeyError::NoAccessKeys(user_name.to_string())),
        [key] if key.access_key_id == in_use.access_key_id => Ok(key.access_key_id.clone()),
        [key] => Err(CloudkeyError::KeyMismatch {
            user: user_name.to_string(),
            listed: key.access_key_id.clone(),
            in_use: in_use.access_key_id.clone(),
        }),
        _ => Err(CloudkeyError::TooManyKeys {
            user: user_name.to_string(),
            count: keys.len(),
        }),
    }
}
