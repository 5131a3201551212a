pub mod config;
pub mod error;
pub mod identity;
pub mod lookup;
pub mod paths;
pub mod profile;
pub mod remote;
pub mod rotation;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{LookupConfig, RotationConfig, StoreConfig};
pub use error::{CloudkeyError, RemoteError, RemoteErrorCode, Result};
pub use lookup::enrich_all;
pub use profile::{
    Credential, CredentialStore, EnvStore, Identity, ProcessEnv, Profile, ProfileResolver,
    ProfileSet, Source,
};
pub use remote::{AwsSessionFactory, SessionFactory};
pub use rotation::{RotationEngine, RotationReport};
