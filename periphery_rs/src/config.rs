//! Network configuration builder and the aggregate deployment configuration.
//!
//! [`DeployConfig::load`] is the single entry point: it reads the environment once,
//! runs the explorer integrity check, and produces an immutable configuration with one
//! [`NetworkEndpoint`] per supported network plus compiler and watcher profiles.

use periphery_utils::SupportedChainId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::accounts::AccountStrategy;
use crate::constants::{
    DEFAULT_NETWORK, DEPLOYER_ROLE, DEV_MNEMONIC, HOSTED_PROVIDER, INFURA_API_KEY,
    LOCAL_ACCOUNT_COUNT, MNEMONIC, NETWORK_TIMEOUT,
};
use crate::env::Env;
use crate::error::ConfigError;
use crate::explorers::{CustomChain, ExplorerApiKeys, ExplorerRegistry};
use crate::integrity::verify_config_integrity;

const REDACTED: &str = "<redacted>";

/// Hosted RPC provider serving networks at `https://{network}.{name}.io/v3/{api_key}`.
#[derive(Clone, PartialEq, Eq)]
pub struct HostedProvider {
    pub name: &'static str,
    api_key: String,
}

impl HostedProvider {
    pub fn new(name: &'static str, api_key: impl Into<String>) -> Self {
        Self {
            name,
            api_key: api_key.into(),
        }
    }

    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        Ok(Self::new(HOSTED_PROVIDER, env.require(INFURA_API_KEY)?))
    }

    pub fn url_for(&self, chain: SupportedChainId) -> String {
        format!(
            "https://{}.{}.io/v3/{}",
            chain.name(),
            self.name,
            self.api_key
        )
    }

    fn redact(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            return url.to_string();
        }
        url.replace(&self.api_key, REDACTED)
    }
}

impl std::fmt::Debug for HostedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// RPC URL for `chain`: the hosted provider when it serves the network, otherwise the
/// network's default URL.
pub fn chain_url(chain: SupportedChainId, hosted: &HostedProvider) -> String {
    if chain.is_hosted() {
        hosted.url_for(chain)
    } else {
        chain.default_rpc_url().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEndpoint {
    pub chain_id: SupportedChainId,
    #[serde(skip)]
    pub name: &'static str,
    pub url: String,
    pub accounts: AccountStrategy,
    #[serde(serialize_with = "serialize_millis")]
    pub timeout: Duration,
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(value.as_millis() as u64)
}

/// Produces a [`NetworkEndpoint`] per network from the hosted provider and the
/// deployer credentials.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    hosted: HostedProvider,
    accounts: AccountStrategy,
    local_mnemonic: String,
}

impl NetworkConfigBuilder {
    pub fn new(hosted: HostedProvider, accounts: AccountStrategy) -> Self {
        let local_mnemonic = match &accounts {
            AccountStrategy::MnemonicDerived { phrase, .. } => phrase.clone(),
            AccountStrategy::SingleKey(_) => DEV_MNEMONIC.to_string(),
        };
        Self {
            hosted,
            accounts,
            local_mnemonic,
        }
    }

    /// Requires `INFURA_API_KEY` and one of `DEPLOYER_PK` / `MNEMONIC`.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let hosted = HostedProvider::from_env(env)?;
        let accounts = AccountStrategy::from_env(env)?;
        let mut builder = Self::new(hosted, accounts);
        if let Some(phrase) = env.get(MNEMONIC) {
            builder.local_mnemonic = phrase.to_string();
        }
        Ok(builder)
    }

    pub fn hosted(&self) -> &HostedProvider {
        &self.hosted
    }

    pub fn build(&self, chain: SupportedChainId) -> NetworkEndpoint {
        // Local nodes always sign with mnemonic accounts.
        let accounts = if chain.is_local() {
            AccountStrategy::mnemonic(&self.local_mnemonic, LOCAL_ACCOUNT_COUNT)
        } else {
            self.accounts.clone()
        };

        NetworkEndpoint {
            chain_id: chain,
            name: chain.name(),
            url: chain_url(chain, &self.hosted),
            accounts,
            timeout: NETWORK_TIMEOUT,
        }
    }

    /// Builds endpoints for raw chain ids, rejecting any id outside the enumeration.
    pub fn build_from_ids<I>(&self, ids: I) -> Result<BTreeMap<String, NetworkEndpoint>, ConfigError>
    where
        I: IntoIterator<Item = u64>,
    {
        ids.into_iter()
            .map(|id| {
                let chain = SupportedChainId::try_from(id)?;
                Ok((chain.name().to_string(), self.build(chain)))
            })
            .collect()
    }

    pub fn build_all(&self) -> Result<BTreeMap<String, NetworkEndpoint>, ConfigError> {
        self.build_from_ids(SupportedChainId::ALL.into_iter().map(SupportedChainId::id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Optimizer {
    pub enabled: bool,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub bytecode_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub evm_version: String,
    pub optimizer: Optimizer,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerSettings {
    pub version: String,
    pub settings: CompilerOptions,
}

impl CompilerSettings {
    fn with_runs(runs: u32) -> Self {
        Self {
            version: "0.7.6".to_string(),
            settings: CompilerOptions {
                evm_version: "istanbul".to_string(),
                optimizer: Optimizer {
                    enabled: true,
                    runs,
                },
                metadata: Metadata {
                    bytecode_hash: "none".to_string(),
                },
            },
        }
    }

    pub fn default_profile() -> Self {
        Self::with_runs(1_000_000)
    }

    pub fn low_optimizer() -> Self {
        Self::with_runs(2_000)
    }

    pub fn lowest_optimizer() -> Self {
        Self::with_runs(1_000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolidityConfig {
    pub compilers: Vec<CompilerSettings>,
    pub overrides: BTreeMap<String, CompilerSettings>,
}

impl Default for SolidityConfig {
    fn default() -> Self {
        let low = [
            "contracts/NonfungiblePositionManager.sol",
            "contracts/test/MockTimeNonfungiblePositionManager.sol",
        ];
        let lowest = [
            "contracts/test/NFTDescriptorTest.sol",
            "contracts/NonfungibleTokenPositionDescriptor.sol",
            "contracts/libraries/NFTDescriptor.sol",
        ];

        let overrides = low
            .into_iter()
            .map(|path| (path.to_string(), CompilerSettings::low_optimizer()))
            .chain(
                lowest
                    .into_iter()
                    .map(|path| (path.to_string(), CompilerSettings::lowest_optimizer())),
            )
            .collect();

        Self {
            compilers: vec![CompilerSettings::default_profile()],
            overrides,
        }
    }
}

impl SolidityConfig {
    /// Settings a source file is compiled with: its override, else the first compiler.
    pub fn settings_for(&self, source: &str) -> Option<&CompilerSettings> {
        self.overrides
            .get(source)
            .or_else(|| self.compilers.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchTaskParams {
    pub test_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchTask {
    pub command: String,
    pub params: WatchTaskParams,
}

/// Re-runs `tasks` when a file matching `files` changes; `{path}` in task parameters is
/// replaced with the changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchJob {
    pub tasks: Vec<WatchTask>,
    pub files: Vec<String>,
    pub verbose: bool,
}

impl WatchJob {
    pub fn test_job() -> Self {
        Self {
            tasks: vec![WatchTask {
                command: "test".to_string(),
                params: WatchTaskParams {
                    test_files: vec!["{path}".to_string()],
                },
            }],
            files: vec!["./test/**/*".to_string()],
            verbose: true,
        }
    }

    pub fn matches(&self, changed: &str) -> bool {
        let changed = changed.strip_prefix("./").unwrap_or(changed);
        self.files.iter().any(|pattern| {
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
            match pattern.find('*') {
                Some(idx) => changed.starts_with(&pattern[..idx]),
                None => changed == pattern,
            }
        })
    }

    /// Tasks to run for a changed file, with `{path}` substituted. Empty when the file
    /// is not watched.
    pub fn tasks_for(&self, changed: &str) -> Vec<WatchTask> {
        if !self.matches(changed) {
            return Vec::new();
        }
        self.tasks
            .iter()
            .map(|task| WatchTask {
                command: task.command.clone(),
                params: WatchTaskParams {
                    test_files: task
                        .params
                        .test_files
                        .iter()
                        .map(|f| f.replace("{path}", changed))
                        .collect(),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanConfig {
    pub api_key: BTreeMap<String, String>,
    pub custom_chains: Vec<CustomChain>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    pub default_network: String,
    pub named_accounts: BTreeMap<String, u32>,
    pub networks: BTreeMap<String, NetworkEndpoint>,
    pub etherscan: EtherscanConfig,
    pub solidity: SolidityConfig,
    pub watcher: BTreeMap<String, WatchJob>,
    #[serde(skip)]
    hosted: Option<HostedProvider>,
}

impl DeployConfig {
    /// Builds the configuration from the environment with the built-in explorer tables.
    pub fn load(env: &Env) -> Result<Self, ConfigError> {
        Self::load_with(env, ExplorerRegistry::from_env(env), ExplorerApiKeys::from_env(env))
    }

    /// Like [`DeployConfig::load`] with explicit explorer tables.
    pub fn load_with(
        env: &Env,
        registry: ExplorerRegistry,
        keys: ExplorerApiKeys,
    ) -> Result<Self, ConfigError> {
        let builder = NetworkConfigBuilder::from_env(env)?;
        verify_config_integrity(&registry, &keys)?;

        let networks = builder.build_all()?;
        debug!("Configured {} networks", networks.len());

        let config = Self {
            default_network: DEFAULT_NETWORK.to_string(),
            named_accounts: BTreeMap::from([(DEPLOYER_ROLE.to_string(), 0)]),
            networks,
            etherscan: EtherscanConfig {
                api_key: keys.by_network_name(),
                custom_chains: registry.custom_chains(),
            },
            solidity: SolidityConfig::default(),
            watcher: BTreeMap::from([("test".to_string(), WatchJob::test_job())]),
            hosted: Some(builder.hosted().clone()),
        };

        info!(
            "Loaded configuration: networks={}, custom explorers={}",
            config.networks.len(),
            config.etherscan.custom_chains.len()
        );
        Ok(config)
    }

    pub fn network(&self, chain: SupportedChainId) -> Option<&NetworkEndpoint> {
        self.networks.get(chain.name())
    }

    /// Copy safe to print: hosted-provider keys are removed from URLs and explorer keys
    /// are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(hosted) = &self.hosted {
            for endpoint in copy.networks.values_mut() {
                endpoint.url = hosted.redact(&endpoint.url);
            }
        }
        for key in copy.etherscan.api_key.values_mut() {
            if !key.is_empty() {
                *key = REDACTED.to_string();
            }
        }
        copy.hosted = None;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEPLOYER_PK, FRAMEWORK_DEFAULT_TIMEOUT};
    use crate::error::IntegrityError;
    use crate::explorers::ExplorerUrls;

    const DEV_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn mnemonic_env() -> Env {
        Env::from_pairs([(INFURA_API_KEY, "infurakey"), (MNEMONIC, DEV_MNEMONIC)])
    }

    #[test]
    fn every_network_gets_one_endpoint() {
        let config = DeployConfig::load(&mnemonic_env()).unwrap();
        assert_eq!(config.networks.len(), SupportedChainId::ALL.len());

        for chain in SupportedChainId::ALL {
            let endpoint = config.network(chain).unwrap();
            assert_eq!(endpoint.chain_id, chain);
            assert!(!endpoint.url.is_empty());
            assert!(endpoint.timeout >= FRAMEWORK_DEFAULT_TIMEOUT);
        }
    }

    #[test]
    fn hosted_networks_use_provider_url() {
        let config = DeployConfig::load(&mnemonic_env()).unwrap();
        assert_eq!(
            config.network(SupportedChainId::BaseMainnet).unwrap().url,
            "https://base-mainnet.infura.io/v3/infurakey"
        );
        assert_eq!(
            config.network(SupportedChainId::EthereumMainnet).unwrap().url,
            "https://mainnet.infura.io/v3/infurakey"
        );
        assert_eq!(
            config.network(SupportedChainId::InkSepolia).unwrap().url,
            "https://rpc-gel-sepolia.inkonchain.com"
        );
    }

    #[test]
    fn missing_hosted_key_is_fatal() {
        let env = Env::from_pairs([(MNEMONIC, DEV_MNEMONIC)]);
        assert!(matches!(
            DeployConfig::load(&env),
            Err(ConfigError::MissingEnv(INFURA_API_KEY))
        ));
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let env = Env::from_pairs([(INFURA_API_KEY, "infurakey")]);
        assert!(matches!(
            DeployConfig::load(&env),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn private_key_networks_use_single_signer_but_local_ones_do_not() {
        let env = Env::from_pairs([(INFURA_API_KEY, "k"), (DEPLOYER_PK, DEV_KEY_0)]);
        let config = DeployConfig::load(&env).unwrap();

        let ink = config.network(SupportedChainId::InkSepolia).unwrap();
        assert_eq!(ink.accounts.account_count(), 1);

        let hardhat = config.network(SupportedChainId::Hardhat).unwrap();
        assert_eq!(
            hardhat.accounts,
            AccountStrategy::mnemonic(DEV_MNEMONIC, LOCAL_ACCOUNT_COUNT)
        );
        assert_eq!(hardhat.url, "http://127.0.0.1:8545");
    }

    #[test]
    fn rejects_unknown_chain_ids() {
        let builder = NetworkConfigBuilder::from_env(&mnemonic_env()).unwrap();
        let err = builder.build_from_ids([1, 424242]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownChainId(_)));
    }

    #[test]
    fn missing_explorer_key_fails_load() {
        let registry = ExplorerRegistry::from_entries([(
            SupportedChainId::KavaMainnet,
            ExplorerUrls::new("https://kavascan.com/api", "https://kavascan.com/"),
        )]);
        let keys = ExplorerApiKeys::from_entries([(SupportedChainId::BaseMainnet, "x")]);
        let err = DeployConfig::load_with(&mnemonic_env(), registry, keys).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Integrity(IntegrityError::MissingApiKey {
                chain: SupportedChainId::KavaMainnet
            })
        ));
        assert!(err.to_string().contains("kava-mainnet"));
    }

    #[test]
    fn compiler_overrides_follow_source_paths() {
        let solidity = SolidityConfig::default();
        assert_eq!(solidity.compilers[0].settings.optimizer.runs, 1_000_000);
        assert_eq!(
            solidity
                .settings_for("contracts/NonfungiblePositionManager.sol")
                .unwrap()
                .settings
                .optimizer
                .runs,
            2_000
        );
        assert_eq!(
            solidity
                .settings_for("contracts/libraries/NFTDescriptor.sol")
                .unwrap()
                .settings
                .optimizer
                .runs,
            1_000
        );
        assert_eq!(
            solidity
                .settings_for("contracts/SwapRouter.sol")
                .unwrap()
                .settings
                .optimizer
                .runs,
            1_000_000
        );
        assert_eq!(solidity.overrides.len(), 5);
    }

    #[test]
    fn settings_without_compilers_fall_back_to_overrides_only() {
        let solidity = SolidityConfig {
            compilers: Vec::new(),
            ..SolidityConfig::default()
        };
        assert!(solidity.settings_for("contracts/SwapRouter.sol").is_none());
        assert_eq!(
            solidity.settings_for("contracts/V3Migrator.sol"),
            None
        );
        assert_eq!(
            solidity.settings_for("contracts/NonfungiblePositionManager.sol"),
            Some(&CompilerSettings::low_optimizer())
        );
    }

    #[test]
    fn watcher_maps_changed_test_files() {
        let job = WatchJob::test_job();
        let tasks = job.tasks_for("./test/SwapRouter.spec.ts");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].command, "test");
        assert_eq!(tasks[0].params.test_files, vec!["./test/SwapRouter.spec.ts"]);
        assert!(job.tasks_for("contracts/SwapRouter.sol").is_empty());
    }

    #[test]
    fn redacted_config_hides_secrets() {
        let env = Env::from_pairs([
            (INFURA_API_KEY, "infurakey"),
            (MNEMONIC, DEV_MNEMONIC),
            ("ETHERSCAN_API_KEY", "etherscankey"),
        ]);
        let config = DeployConfig::load(&env).unwrap();
        let json = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!json.contains("infurakey"));
        assert!(!json.contains("etherscankey"));
        assert!(!json.contains("junk"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["defaultNetwork"], "hardhat");
        assert_eq!(value["namedAccounts"]["deployer"], 0);
        assert_eq!(value["networks"]["ink-sepolia"]["chainId"], 763373);
        assert_eq!(value["networks"]["ink-sepolia"]["timeout"], 60_000);
        assert_eq!(value["networks"]["ink-sepolia"]["accounts"]["count"], 10);
        assert_eq!(value["watcher"]["test"]["files"][0], "./test/**/*");
    }
}
