//! Identity lookup fan-out for the wide listing.
//!
//! One future per profile, all joined before returning. A failed or timed
//! out lookup only costs that profile its identity.

use futures::future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LookupConfig;
use crate::error::Result;
use crate::identity;
use crate::profile::{Credential, Identity, Profile, ProfileSet};
use crate::remote::SessionFactory;

/// Attach the caller identity to every profile that has a credential.
///
/// Input order is preserved.
pub async fn enrich_all(
    profiles: ProfileSet,
    sessions: &dyn SessionFactory,
    config: &LookupConfig,
) -> ProfileSet {
    let lookups: Vec<_> = profiles
        .into_iter()
        .map(|profile| enrich(profile, sessions, config.timeout))
        .collect();

    future::join_all(lookups).await.into_iter().collect()
}

async fn enrich(mut profile: Profile, sessions: &dyn SessionFactory, timeout: Duration) -> Profile {
    if !profile.cred.is_complete() {
        debug!(profile = profile.display_name(), "No credential, skipping lookup");
        return profile;
    }

    match tokio::time::timeout(timeout, lookup(&profile.cred, sessions)).await {
        Ok(Ok(identity)) => profile.identity = Some(identity),
        Ok(Err(e)) => {
            warn!(profile = profile.display_name(), error = %e, "Identity lookup failed");
        }
        Err(_) => {
            warn!(
                profile = profile.display_name(),
                timeout_secs = timeout.as_secs_f64(),
                "Identity lookup timed out"
            );
        }
    }
    profile
}

async fn lookup(cred: &Credential, sessions: &dyn SessionFactory) -> Result<Identity> {
    let session = sessions.establish(cred).await?;
    identity::verify(&session).await
}
