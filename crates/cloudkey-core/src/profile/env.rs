//! Environment variable backends
//!
//! The resolver never reads `std::env` directly; it goes through an
//! [`EnvStore`] so tests can inject an in-memory environment.

use parking_lot::RwLock;
use std::collections::HashMap;

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const DEFAULT_PROFILE_VAR: &str = "AWS_DEFAULT_PROFILE";
pub const PROFILE_VAR: &str = "AWS_PROFILE";
pub const SHARED_CREDENTIALS_FILE_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// Read/write access to environment variables
pub trait EnvStore: Send + Sync {
    /// Look up a variable; `None` when unset
    fn get(&self, key: &str) -> Option<String>;

    /// Set a variable for the rest of the process
    fn set(&self, key: &str, value: &str);
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        // SAFETY: cloudkey only writes the environment from the sequential
        // rotation path, never while other tasks read it.
        unsafe { std::env::set_var(key, value) };
    }
}

/// In-memory environment
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            vars: RwLock::new(vars),
        }
    }

    pub fn remove(&self, key: &str) {
        self.vars.write().remove(key);
    }
}

impl EnvStore for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.vars.write().insert(key.to_string(), value.to_string());
    }
}
