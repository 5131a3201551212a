//! Error types for cloudkey

use std::fmt;
use thiserror::Error;

/// Well-known remote error codes.
///
/// The rotation engine treats every code as terminal. `AccessDenied` and
/// `InvalidClientTokenId` are also what a freshly issued key answers with
/// until it has propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorCode {
    NoSuchEntity,
    LimitExceeded,
    ServiceFailure,
    AccessDenied,
    InvalidClientTokenId,
    Other(String),
    Unknown,
}

impl RemoteErrorCode {
    /// Map an AWS error code string onto a known code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("NoSuchEntity") => Self::NoSuchEntity,
            Some("LimitExceeded") => Self::LimitExceeded,
            Some("ServiceFailure") => Self::ServiceFailure,
            Some("AccessDenied") | Some("AccessDeniedException") => Self::AccessDenied,
            Some("InvalidClientTokenId") => Self::InvalidClientTokenId,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Unknown,
        }
    }

    /// Whether the code is what a not-yet-propagated key returns.
    pub fn is_propagation_pending(&self) -> bool {
        matches!(self, Self::AccessDenied | Self::InvalidClientTokenId)
    }
}

impl fmt::Display for RemoteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchEntity => write!(f, "NoSuchEntity"),
            Self::LimitExceeded => write!(f, "LimitExceeded"),
            Self::ServiceFailure => write!(f, "ServiceFailure"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::InvalidClientTokenId => write!(f, "InvalidClientTokenId"),
            Self::Other(code) => write!(f, "{code}"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A failed call against the identity or key-management service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service}:{operation} failed ({code}): {message}")]
pub struct RemoteError {
    pub service: &'static str,
    pub operation: &'static str,
    pub code: RemoteErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(
        service: &'static str,
        operation: &'static str,
        code: RemoteErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service,
            operation,
            code,
            message: message.into(),
        }
    }
}

/// cloudkey error types
#[derive(Error, Debug)]
pub enum CloudkeyError {
    #[error("No rotatable credential found. You may need to run aws configure")]
    CredentialNotFound,

    #[error("No credential with profile name {0} found")]
    ProfileNotFound(String),

    #[error("Unknown credential source: {0}")]
    UnknownSource(String),

    #[error("Unsupported identity type {kind:?} for {arn}: only IAM users can rotate keys")]
    UnsupportedIdentityType { kind: String, arn: String },

    #[error("Invalid ARN: {0}")]
    InvalidArn(String),

    #[error("Too many access keys for user {user} ({count}); delete the unused key and try again")]
    TooManyKeys { user: String, count: usize },

    #[error("No access keys listed for user {0}")]
    NoAccessKeys(String),

    #[error("Access key {listed} owned by {user} is not the key in use ({in_use})")]
    KeyMismatch {
        user: String,
        listed: String,
        in_use: String,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to parse credentials file {path}: {message}")]
    CredentialsFile { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudkeyError {
    /// The remote error code, when the failure came from a service call.
    pub fn remote_code(&self) -> Option<&RemoteErrorCode> {
        match self {
            CloudkeyError::Remote(err) => Some(&err.code),
            _ => None,
        }
    }
}

/// Result type alias for cloudkey operations
pub type Result<T> = std::result::Result<T, CloudkeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_code_mapping() {
        assert_eq!(
            RemoteErrorCode::from_code(Some("NoSuchEntity")),
            RemoteErrorCode::NoSuchEntity
        );
        assert_eq!(
            RemoteErrorCode::from_code(Some("Throttling")),
            RemoteErrorCode::Other("Throttling".to_string())
        );
        assert_eq!(RemoteErrorCode::from_code(None), RemoteErrorCode::Unknown);
    }

    #[test]
    fn test_propagation_pending_codes() {
        assert!(RemoteErrorCode::InvalidClientTokenId.is_propagation_pending());
        assert!(RemoteErrorCode::AccessDenied.is_propagation_pending());
        assert!(!RemoteErrorCode::LimitExceeded.is_propagation_pending());
    }

    #[test]
    fn test_remote_error_display() {
        let err = CloudkeyError::from(RemoteError::new(
            "iam",
            "CreateAccessKey",
            RemoteErrorCode::LimitExceeded,
            "Cannot exceed quota for AccessKeysPerUser: 2",
        ));
        assert_eq!(
            err.to_string(),
            "iam:CreateAccessKey failed (LimitExceeded): Cannot exceed quota for AccessKeysPerUser: 2"
        );
        assert_eq!(err.remote_code(), Some(&RemoteErrorCode::LimitExceeded));
    }
}
