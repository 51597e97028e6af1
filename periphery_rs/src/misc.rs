//! Per-network deployment inputs: the built-in table plus optional TOML overrides.
//!
//! Override file format:
//!
//! ```toml
//! [chains.ink-sepolia]
//! pool_factory = "0xcfEA11557Bc9cB71bc6916e09fC8493D668b8d53"
//! wrapped_native = "0x4200000000000000000000000000000000000006"
//! wrapped_native_symbol = "WETH9"
//! ```
//!
//! Table keys may be network names or decimal chain ids.

use periphery_utils::{misc_info, MiscInfo, SupportedChainId};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{ConfigError, DeployError};

#[derive(Debug, Deserialize)]
struct MiscInfoFile {
    #[serde(default)]
    chains: BTreeMap<String, MiscInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiscInfoRegistry {
    entries: BTreeMap<SupportedChainId, MiscInfo>,
}

impl MiscInfoRegistry {
    pub fn builtin() -> Self {
        let entries = SupportedChainId::ALL
            .into_iter()
            .filter_map(|chain| misc_info(chain).map(|info| (chain, info)))
            .collect();
        Self { entries }
    }

    /// Parses override entries and layers them over `self`.
    pub fn merge_toml(mut self, contents: &str) -> Result<Self, ConfigError> {
        let file: MiscInfoFile = toml::from_str(contents)?;
        for (key, info) in file.chains {
            let chain: SupportedChainId = key.parse()?;
            self.entries.insert(chain, info);
        }
        Ok(self)
    }

    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::MiscInfoIo {
            path: path.to_path_buf(),
            source,
        })?;
        let merged = self.merge_toml(&contents)?;
        info!(
            "Loaded misc info overrides from {}: {} networks configured",
            path.display(),
            merged.entries.len()
        );
        Ok(merged)
    }

    pub fn insert(&mut self, chain: SupportedChainId, info: MiscInfo) {
        self.entries.insert(chain, info);
    }

    pub fn get(&self, chain: SupportedChainId) -> Option<&MiscInfo> {
        self.entries.get(&chain)
    }

    /// Entry for the active network; its absence aborts the deployment.
    pub fn require(&self, chain: SupportedChainId) -> Result<&MiscInfo, DeployError> {
        self.get(chain).ok_or(DeployError::MissingMiscInfo(chain))
    }
}
