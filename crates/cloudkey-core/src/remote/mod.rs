//! Remote services
//!
//! The identity service (STS) and the key-management service (IAM) are
//! reached through traits so the rotation engine and the lookup fan-out can
//! run against the AWS SDK or an in-memory fake.

pub mod arn;
pub mod aws;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::profile::Credential;

pub use arn::Arn;
pub use aws::AwsSessionFactory;

/// Raw answer of the "who am I" call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

/// Status of an access key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Active,
    Inactive,
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStatus::Active => write!(f, "Active"),
            KeyStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

/// Metadata of an existing access key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKeyInfo {
    pub access_key_id: String,
    pub status: KeyStatus,
}

/// A freshly created access key, including its secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl From<NewAccessKey> for Credential {
    fn from(key: NewAccessKey) -> Self {
        Credential::new(key.access_key_id, key.secret_access_key)
    }
}

/// Identity service (STS)
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Ask who the session's credential belongs to
    async fn get_caller_identity(&self) -> Result<CallerIdentity>;
}

/// Key-management service (IAM)
#[async_trait]
pub trait KeyManagementService: Send + Sync {
    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<AccessKeyInfo>>;

    async fn create_access_key(&self, user_name: &str) -> Result<NewAccessKey>;

    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> Result<()>;

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> Result<()>;
}

/// Authenticated clients built from one credential
#[derive(Clone)]
pub struct Session {
    access_key_id: String,
    identity: Arc<dyn IdentityService>,
    keys: Arc<dyn KeyManagementService>,
}

impl Session {
    pub fn new(
        access_key_id: impl Into<String>,
        identity: Arc<dyn IdentityService>,
        keys: Arc<dyn KeyManagementService>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            identity,
            keys,
        }
    }

    /// Access key id the session signs with
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn identity(&self) -> &dyn IdentityService {
        self.identity.as_ref()
    }

    pub fn keys(&self) -> &dyn KeyManagementService {
        self.keys.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Builds sessions from credentials
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn establish(&self, credential: &Credential) -> Result<Session>;
}
