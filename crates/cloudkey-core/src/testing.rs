//! In-memory AWS account for tests.
//!
//! Keys authenticate only while active and only with their own secret, the
//! key quota per user is two, and freshly created keys can be made to fail
//! a number of calls to mimic propagation lag.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CloudkeyError, RemoteError, RemoteErrorCode, Result};
use crate::profile::Credential;
use crate::remote::{
    AccessKeyInfo, CallerIdentity, IdentityService, KeyManagementService, KeyStatus, NewAccessKey,
    Session, SessionFactory,
};

const MAX_KEYS_PER_USER: usize = 2;

#[derive(Debug, Clone)]
struct FakeKey {
    access_key_id: String,
    secret_access_key: String,
    arn: String,
    user_name: Option<String>,
    status: KeyStatus,
    pending_calls: u32,
}

#[derive(Debug, Default)]
struct CloudState {
    account: String,
    keys: Vec<FakeKey>,
    next_key: u32,
    calls: Vec<String>,
    failures: HashMap<String, RemoteErrorCode>,
    propagation_calls: u32,
    identity_delay: Option<Duration>,
    unlisted_users: HashSet<String>,
}

impl CloudState {
    fn issue(
        &mut self,
        arn: String,
        user_name: Option<String>,
        pending_calls: u32,
    ) -> NewAccessKey {
        self.next_key += 1;
        let key = NewAccessKey {
            access_key_id: format!("AKIAFAKE{:012}", self.next_key),
            secret_access_key: format!("fake-secret-{}", self.next_key),
        };
        self.keys.push(FakeKey {
            access_key_id: key.access_key_id.clone(),
            secret_access_key: key.secret_access_key.clone(),
            arn,
            user_name,
            status: KeyStatus::Active,
            pending_calls,
        });
        key
    }

    fn record(
        &mut self,
        service: &'static str,
        operation: &'static str,
        caller: &str,
    ) -> Result<()> {
        self.calls.push(format!("{service}:{operation}:{caller}"));
        match self.failures.get(operation) {
            Some(code) => {
                Err(RemoteError::new(service, operation, code.clone(), "injected failure").into())
            }
            None => Ok(()),
        }
    }

    fn authenticate(
        &mut self,
        service: &'static str,
        operation: &'static str,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<FakeKey> {
        let denied = || -> CloudkeyError {
            RemoteError::new(
                service,
                operation,
                RemoteErrorCode::InvalidClientTokenId,
                "The security token included in the request is invalid.",
            )
            .into()
        };

        let key = self
            .keys
            .iter_mut()
            .find(|k| {
                k.access_key_id == access_key_id
                    && k.secret_access_key == secret_access_key
                    && k.status == KeyStatus::Active
            })
            .ok_or_else(denied)?;

        if key.pending_calls > 0 {
            key.pending_calls -= 1;
            return Err(denied());
        }
        Ok(key.clone())
    }
}

/// Shared fake account; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct FakeCloud {
    state: Arc<Mutex<CloudState>>,
}

impl FakeCloud {
    pub fn new(account: impl Into<String>) -> Self {
        let state = CloudState {
            account: account.into(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Create an active key for an IAM user
    pub fn add_user_key(&self, user_name: &str) -> NewAccessKey {
        let mut state = self.state.lock();
        let arn = format!("arn:aws:iam::{}:user/{}", state.account, user_name);
        state.issue(arn, Some(user_name.to_string()), 0)
    }

    /// Create an active key whose caller identity is an assumed role
    pub fn add_role_key(&self, role_name: &str) -> NewAccessKey {
        let mut state = self.state.lock();
        let arn = format!(
            "arn:aws:sts::{}:assumed-role/{}/cloudkey-session",
            state.account, role_name
        );
        state.issue(arn, None, 0)
    }

    /// Make every call of `operation` fail with `code`
    pub fn fail(&self, operation: &str, code: RemoteErrorCode) {
        self.state.lock().failures.insert(operation.to_string(), code);
    }

    /// Keys created from now on reject their first `calls` requests
    pub fn set_propagation_calls(&self, calls: u32) {
        self.state.lock().propagation_calls = calls;
    }

    /// `ListAccessKeys` reports no keys for `user_name`, while the keys keep working
    pub fn hide_keys_of(&self, user_name: &str) {
        self.state.lock().unlisted_users.insert(user_name.to_string());
    }

    /// Delay every identity call
    pub fn set_identity_delay(&self, delay: Duration) {
        self.state.lock().identity_delay = Some(delay);
    }

    pub fn keys_for(&self, user_name: &str) -> Vec<AccessKeyInfo> {
        self.state
            .lock()
            .keys
            .iter()
            .filter(|k| k.user_name.as_deref() == Some(user_name))
            .map(|k| AccessKeyInfo {
                access_key_id: k.access_key_id.clone(),
                status: k.status,
            })
            .collect()
    }

    pub fn active_keys_for(&self, user_name: &str) -> Vec<String> {
        self.keys_for(user_name)
            .into_iter()
            .filter(|k| k.status == KeyStatus::Active)
            .map(|k| k.access_key_id)
            .collect()
    }

    /// Secret of a key, if it still exists
    pub fn secret_of(&self, access_key_id: &str) -> Option<String> {
        self.state
            .lock()
            .keys
            .iter()
            .find(|k| k.access_key_id == access_key_id)
            .map(|k| k.secret_access_key.clone())
    }

    /// Calls made so far, as `service:Operation:access_key_id`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.calls()
            .iter()
            .any(|call| call.split(':').nth(1) == Some(operation))
    }
}

#[async_trait]
impl SessionFactory for FakeCloud {
    async fn establish(&self, credential: &Credential) -> Result<Session> {
        if !credential.is_complete() {
            return Err(CloudkeyError::CredentialNotFound);
        }
        let client = Arc::new(FakeClient {
            cloud: self.clone(),
            access_key_id: credential.access_key_id.clone(),
            secret_access_key: credential.secret_access_key.clone(),
        });
        Ok(Session::new(
            credential.access_key_id.clone(),
            client.clone(),
            client,
        ))
    }
}

struct FakeClient {
    cloud: FakeCloud,
    access_key_id: String,
    secret_access_key: String,
}

impl FakeClient {
    fn call<R>(
        &self,
        service: &'static str,
        operation: &'static str,
        f: impl FnOnce(&mut CloudState, &FakeKey) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.cloud.state.lock();
        state.record(service, operation, &self.access_key_id)?;
        let caller = state.authenticate(
            service,
            operation,
            &self.access_key_id,
            &self.secret_access_key,
        )?;
        f(&mut state, &caller)
    }
}

fn no_such_entity(operation: &'static str, message: String) -> CloudkeyError {
    RemoteError::new("iam", operation, RemoteErrorCode::NoSuchEntity, message).into()
}

#[async_trait]
impl IdentityService for FakeClient {
    async fn get_caller_identity(&self) -> Result<CallerIdentity> {
        let delay = self.cloud.state.lock().identity_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.call("sts", "GetCallerIdentity", |state, caller| {
            Ok(CallerIdentity {
                account: state.account.clone(),
                arn: caller.arn.clone(),
                user_id: format!("AIDA{}", caller.arn.len()),
            })
        })
    }
}

#[async_trait]
impl KeyManagementService for FakeClient {
    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<AccessKeyInfo>> {
        self.call("iam", "ListAccessKeys", |state, _| {
            if state.unlisted_users.contains(user_name) {
                return Ok(Vec::new());
            }
            Ok(state
                .keys
                .iter()
                .filter(|k| k.user_name.as_deref() == Some(user_name))
                .map(|k| AccessKeyInfo {
                    access_key_id: k.access_key_id.clone(),
                    status: k.status,
                })
                .collect())
        })
    }

    async fn create_access_key(&self, user_name: &str) -> Result<NewAccessKey> {
        self.call("iam", "CreateAccessKey", |state, _| {
            let existing: Vec<&FakeKey> = state
                .keys
                .iter()
                .filter(|k| k.user_name.as_deref() == Some(user_name))
                .collect();
            let Some(arn) = existing.first().map(|k| k.arn.clone()) else {
                return Err(no_such_entity(
                    "CreateAccessKey",
                    format!("The user with name {user_name} cannot be found."),
                ));
            };
            if existing.len() >= MAX_KEYS_PER_USER {
                return Err(RemoteError::new(
                    "iam",
                    "CreateAccessKey",
                    RemoteErrorCode::LimitExceeded,
                    "Cannot exceed quota for AccessKeysPerUser: 2",
                )
                .into());
            }
            let pending = state.propagation_calls;
            Ok(state.issue(arn, Some(user_name.to_string()), pending))
        })
    }

    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> Result<()> {
        self.call("iam", "UpdateAccessKey", |state, _| {
            let key = state
                .keys
                .iter_mut()
                .find(|k| {
                    k.access_key_id == access_key_id && k.user_name.as_deref() == Some(user_name)
                })
                .ok_or_else(|| {
                    no_such_entity(
                        "UpdateAccessKey",
                        format!("The Access Key with id {access_key_id} cannot be found."),
                    )
                })?;
            key.status = status;
            Ok(())
        })
    }

    async fn delete_access_key(&self, user_name: &str, access_key_id: &str) -> Result<()> {
        self.call("iam", "DeleteAccessKey", |state, _| {
            let before = state.keys.len();
            state.keys.retain(|k| {
                !(k.access_key_id == access_key_id && k.user_name.as_deref() == Some(user_name))
            });
            if state.keys.len() == before {
                return Err(no_such_entity(
                    "DeleteAccessKey",
                    format!("The Access Key with id {access_key_id} cannot be found."),
                ));
            }
            Ok(())
        })
    }
}
