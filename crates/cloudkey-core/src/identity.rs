//! Identity verification
//!
//! Only IAM users own long-lived access keys, so any other principal
//! (assumed roles, federated users, root) is rejected.

use tracing::debug;

use crate::error::{CloudkeyError, Result};
use crate::profile::Identity;
use crate::remote::{Arn, CallerIdentity, Session};

const USER_RESOURCE_TYPE: &str = "user";

/// Ask the identity service who the session is and require an IAM user.
///
/// Remote failures are returned unchanged.
pub async fn verify(session: &Session) -> Result<Identity> {
    let caller = session.identity().get_caller_identity().await?;
    let identity = identity_from_caller(caller)?;
    debug!(
        access_key_id = session.access_key_id(),
        user = %identity.user_name,
        account = %identity.account,
        "Verified caller identity"
    );
    Ok(identity)
}

/// Validate a caller identity and extract the IAM user name from its ARN
pub fn identity_from_caller(caller: CallerIdentity) -> Result<Identity> {
    let arn = Arn::parse(&caller.arn)?;

    if arn.resource_type() != USER_RESOURCE_TYPE {
        return Err(CloudkeyError::UnsupportedIdentityType {
            kind: arn.resource_type().to_string(),
            arn: caller.arn,
        });
    }

    let user_name = arn.resource_name().to_string();
    Ok(Identity {
        account: caller.account,
        arn: caller.arn,
        user_id: caller.user_id,
        user_name,
    })
}
