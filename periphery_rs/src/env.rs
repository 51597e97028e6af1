//! Snapshot of the process environment.
//!
//! Every component reads configuration through [`Env`] instead of `std::env`, so the
//! whole configuration can be built from literal pairs in tests.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Loads `.env` from the working directory (if present) and snapshots the process environment.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_process()
    }

    /// Loads an explicit env file; unlike [`Env::load`] a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded environment from {}", path.display());
        Ok(Self::from_process())
    }

    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of `key`, treating blank values as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingEnv(key))
    }

    /// Returns the value of `key` or an empty string.
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("Env").field("keys", &keys).finish()
    }
}
