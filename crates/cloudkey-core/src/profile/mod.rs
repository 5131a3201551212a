//! Credential profiles
//!
//! - Discovery from the environment and the shared credentials file
//! - Current-profile precedence
//! - Write-through of rotated credentials

pub mod env;
pub mod file;
pub mod resolver;
pub mod store;
pub mod types;

pub use env::{EnvStore, MapEnv, ProcessEnv};
pub use file::CredentialsFile;
pub use resolver::{DEFAULT_PROFILE_NAME, ProfileResolver};
pub use store::CredentialStore;
pub use types::{AWS_CLOUD, Credential, Identity, Profile, ProfileSet, Source};
