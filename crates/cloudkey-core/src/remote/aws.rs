//! AWS SDK backed sessions (STS + IAM).

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_iam::types::StatusType;
use std::sync::Arc;
use tracing::debug;

use super::{
    AccessKeyInfo, CallerIdentity, IdentityService, KeyManagementService, KeyStatus, NewAccessKey,
    Session, SessionFactory,
};
use crate::error::{CloudkeyError, RemoteError, RemoteErrorCode, Result};
use crate::profile::Credential;

/// IAM is a global service; any region works for it.
const DEFAULT_REGION: &str = "us-east-1";
const PROVIDER_NAME: &str = "cloudkey";

const STS: &str = "sts";
const IAM: &str = "iam";

/// Builds sessions that sign with a static credential
#[derive(Debug, Clone, Default)]
pub struct AwsSessionFactory {
    region: Option<String>,
}

impl AwsSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the region instead of using the default provider chain
    pub fn with_region(region: Option<String>) -> Self {
        Self { region }
    }
}

#[async_trait]
impl SessionFactory for AwsSessionFactory {
    async fn establish(&self, credential: &Credential) -> Result<Session> {
        if !credential.is_complete() {
            return Err(CloudkeyError::CredentialNotFound);
        }

        let credentials = Credentials::new(
            credential.access_key_id.clone(),
            credential.secret_access_key.clone(),
            credential.session_token().map(str::to_string),
            None,
            PROVIDER_NAME,
        );
        let region = match &self.region {
            Some(region) => RegionProviderChain::first_try(Region::new(region.clone())),
            None => RegionProviderChain::default_provider().or_else(DEFAULT_REGION),
        };

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .load()
            .await;

        debug!(
            access_key_id = %credential.access_key_id,
            region = ?config.region(),
            "Established AWS session"
        );

        Ok(Session::new(
            credential.access_key_id.clone(),
            Arc::new(AwsIdentityService {
                client: aws_sdk_sts::Client::new(&config),
            }),
            Arc::new(AwsKeyManagementService {
                client: aws_sdk_iam::Client::new(&config),
            }),
        ))
    }
}

fn remote_error<E>(service: &'static str, operation: &'static str, err: E) -> CloudkeyError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let code = RemoteErrorCode::from_code(err.code());
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    RemoteError::new(service, operation, code, message).into()
}

struct AwsIdentityService {
    client: aws_sdk_sts::Client,
}

#[async_trait]
impl IdentityService for AwsIdentityService {
    async fn get_caller_identity(&self) -> Result<CallerIdentity> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| remote_error(STS, "GetCallerIdentity", e))?;

        Ok(CallerIdentity {
            account: output.account().unwrap_or_default().to_string(),
            arn: output.arn().unwrap_or_default().to_string(),
            user_id: output.user_id().unwrap_or_default().to_string(),
        })
    }
}

struct AwsKeyManagementService {
    client: aws_sdk_iam::Client,
}

fn key_status(status: Option<&StatusType>) -> KeyStatus {
    match status {
        Some(StatusType::Active) => KeyStatus::Active,
        _ => KeyStatus::Inactive,
    }
}

fn status_type(status: KeyStatus) -> StatusType {
    match status {
        KeyStatus::Active => StatusType::Active,
        KeyStatus::Inactive => StatusType::Inactive,
    }
}

#[async_trait]
impl KeyManagementService for AwsKeyManagementService {
    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<AccessKeyInfo>> {
        let output = self
            .client
            .list_access_keys()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| remote_error(IAM, "ListAccessKeys", e))?;

        Ok(output
            .access_key_metadata()
            .iter()
            .filter_map(|metadata| {
                Some(AccessKeyInfo {
                    access_key_id: metadata.access_key_id()?.to_string(),
                    status: key_status(metadata.status()),
                })
            })
            .collect())
    }

    async fn create_access_key(&self, user_name: &str) -> Result<NewAccessKey> {
        let output = self
            .client
            .create_access_key()
            .user_name(user_name)
            .send()
            .await
            .map_err(|e| remote_error(IAM, "CreateAccessKey", e))?;

        let key = output.access_key().ok_or_else(|| {
            RemoteError::new(
                IAM,
                "CreateAccessKey",
                RemoteErrorCode::Unknown,
                "response carried no access key",
            )
        })?;

        Ok(NewAccessKey {
            access_key_id: key.access_key_id().to_string(),
            secret_access_key: key.secret_access_key().to_string(),
        })
    }

    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> Result<()> {
        self.client
            .update_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .status(status_type(status))
            .send()
            .await
            .map_err(|e| remote_error(IAM, "UpdateAccessKey", e))?;
        Ok(())
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> Result<()> {
        self.client
            .delete_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(|e| remote_error(IAM, "DeleteAccessKey", e))?;
        Ok(())
    }
}
