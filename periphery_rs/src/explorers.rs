//! Block-explorer verification endpoints and API keys.
//!
//! Only networks the verification tooling does not already know need an entry in the
//! [`ExplorerRegistry`]. Every registry entry must have a key in [`ExplorerApiKeys`];
//! see [`crate::integrity`].

use periphery_utils::SupportedChainId;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::NODEREAL_API_KEY;
use crate::env::Env;

/// Placeholder for explorers that accept any key.
pub const DUMMY_API_KEY: &str = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplorerUrls {
    #[serde(rename = "apiURL")]
    pub api_url: String,
    #[serde(rename = "browserURL")]
    pub browser_url: String,
}

impl ExplorerUrls {
    pub fn new(api_url: impl Into<String>, browser_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            browser_url: browser_url.into(),
        }
    }
}

/// Entry of the verification tool's custom chain list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomChain {
    pub network: String,
    pub chain_id: u64,
    pub urls: ExplorerUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerRegistry {
    profiles: BTreeMap<SupportedChainId, ExplorerUrls>,
}

impl ExplorerRegistry {
    pub fn from_env(env: &Env) -> Self {
        let nodereal_key = env.get_or_empty(NODEREAL_API_KEY);

        let profiles = [
            (
                SupportedChainId::BaseMainnet,
                ExplorerUrls::new("https://api.basescan.org/api", "https://basescan.org/"),
            ),
            (
                SupportedChainId::FlareMainnet,
                ExplorerUrls::new(
                    "https://api.routescan.io/v2/network/mainnet/evm/14/etherscan",
                    "https://flarescan.com",
                ),
            ),
            (
                SupportedChainId::EvmosMainnet,
                ExplorerUrls::new("https://escan.live/api", "https://escan.live"),
            ),
            (
                SupportedChainId::ArtheraMainnet,
                ExplorerUrls::new(
                    "https://explorer.arthera.net/api",
                    "https://explorer.arthera.net",
                ),
            ),
            (
                SupportedChainId::ArtheraTestnet,
                ExplorerUrls::new(
                    "https://explorer-test.arthera.net/api",
                    "https://explorer-test.arthera.net",
                ),
            ),
            (
                SupportedChainId::CeloMainnet,
                ExplorerUrls::new("https://api.celoscan.io/api", "https://celoscan.io/"),
            ),
            (
                SupportedChainId::BlastMainnet,
                ExplorerUrls::new("https://api.blastscan.io/api", "https://blastscan.io/"),
            ),
            (
                SupportedChainId::KavaMainnet,
                ExplorerUrls::new("https://kavascan.com/api", "https://kavascan.com/"),
            ),
            (
                SupportedChainId::ScrollMainnet,
                ExplorerUrls::new("https://api.scrollscan.com/api", "https://scrollscan.com/"),
            ),
            (
                SupportedChainId::InkSepolia,
                ExplorerUrls::new(
                    "https://explorer-sepolia.inkonchain.com/api",
                    "https://sepolia.inkonscan.xyz/",
                ),
            ),
            (
                SupportedChainId::MantleMainnet,
                ExplorerUrls::new("https://api.mantlescan.xyz/api", "https://mantlescan.xyz"),
            ),
            (
                SupportedChainId::PolygonZkevm,
                ExplorerUrls::new(
                    "https://api-zkevm.polygonscan.com/api",
                    "https://zkevm.polygonscan.com",
                ),
            ),
            (
                SupportedChainId::LineaMainnet,
                ExplorerUrls::new("https://api.lineascan.build/api", "https://lineascan.build/"),
            ),
            (
                SupportedChainId::OpbnbMainnet,
                ExplorerUrls::new(
                    format!(
                        "https://open-platform.nodereal.io/{nodereal_key}/op-bnb-mainnet/contract/"
                    ),
                    "https://opbnbscan.com/",
                ),
            ),
            (
                SupportedChainId::FantomMainnet,
                ExplorerUrls::new("https://api.ftmscan.com/api", "https://ftmscan.com"),
            ),
            (
                SupportedChainId::X1Testnet,
                ExplorerUrls::new(
                    "https://www.oklink.com/api/v5/explorer/contract/verify-source-code-plugin/XLAYER_TESTNET",
                    "https://www.oklink.com/xlayer-test",
                ),
            ),
            (
                SupportedChainId::TaikoHekla,
                ExplorerUrls::new(
                    "https://api.routescan.io/v2/network/testnet/evm/167009/etherscan",
                    "https://hekla.taikoscan.network/",
                ),
            ),
            (
                SupportedChainId::SkaleEuropa,
                ExplorerUrls::new(
                    "https://elated-tan-skat.explorer.mainnet.skalenodes.com/api",
                    "https://elated-tan-skat.explorer.mainnet.skalenodes.com",
                ),
            ),
            (
                SupportedChainId::Haven1Devnet,
                ExplorerUrls::new(
                    "https://explorer-api.staging.haven1.org/api",
                    "https://explorer.staging.haven1.org/",
                ),
            ),
            (
                SupportedChainId::BerachainBartio,
                ExplorerUrls::new(
                    "https://api.routescan.io/v2/network/testnet/evm/80084/etherscan",
                    "https://bartio.beratrail.io",
                ),
            ),
        ];

        Self::from_entries(profiles)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SupportedChainId, ExplorerUrls)>,
    {
        Self {
            profiles: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, chain: SupportedChainId) -> Option<&ExplorerUrls> {
        self.profiles.get(&chain)
    }

    pub fn chains(&self) -> impl Iterator<Item = SupportedChainId> + '_ {
        self.profiles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The custom chain list handed to the verification tool.
    pub fn custom_chains(&self) -> Vec<CustomChain> {
        self.profiles
            .iter()
            .map(|(chain, urls)| CustomChain {
                network: chain.name().to_string(),
                chain_id: chain.id(),
                urls: urls.clone(),
            })
            .collect()
    }
}

enum KeySource {
    Env(&'static str),
    Dummy,
    /// The explorer requires no key at all.
    None,
}

// Registry networks first, then networks the verification tool supports natively.
const API_KEY_SOURCES: &[(SupportedChainId, KeySource)] = &[
    (SupportedChainId::BaseMainnet, KeySource::Env("BASESCAN_API_KEY")),
    (SupportedChainId::EvmosMainnet, KeySource::Env("ESCAN_API_KEY")),
    (SupportedChainId::ArtheraMainnet, KeySource::Dummy),
    (SupportedChainId::ArtheraTestnet, KeySource::Dummy),
    (SupportedChainId::CeloMainnet, KeySource::Env("CELOSCAN_API_KEY")),
    (SupportedChainId::BlastMainnet, KeySource::Env("BLASTSCAN_API_KEY")),
    (SupportedChainId::KavaMainnet, KeySource::Env("KAVASCAN_API_KEY")),
    (SupportedChainId::ScrollMainnet, KeySource::Env("SCROLLSCAN_API_KEY")),
    (SupportedChainId::MantleMainnet, KeySource::Env("MANTLESCAN_API_KEY")),
    (SupportedChainId::PolygonZkevm, KeySource::Env("ZKEVMSCAN_API_KEY")),
    (SupportedChainId::LineaMainnet, KeySource::Env("LINEASCAN_API_KEY")),
    (SupportedChainId::OpbnbMainnet, KeySource::Env("OPBNBSCAN_API_KEY")),
    (SupportedChainId::FantomMainnet, KeySource::Env("FTMSCAN_API_KEY")),
    (SupportedChainId::InkSepolia, KeySource::None),
    (SupportedChainId::Haven1Devnet, KeySource::Dummy),
    (SupportedChainId::X1Testnet, KeySource::Dummy),
    (SupportedChainId::TaikoHekla, KeySource::Dummy),
    (SupportedChainId::SkaleEuropa, KeySource::Dummy),
    (SupportedChainId::FlareMainnet, KeySource::Dummy),
    (SupportedChainId::BerachainBartio, KeySource::Dummy),
    (SupportedChainId::ArbitrumMainnet, KeySource::Env("ARBISCAN_API_KEY")),
    (SupportedChainId::AvalancheMainnet, KeySource::Env("SNOWTRACE_API_KEY")),
    (SupportedChainId::BscMainnet, KeySource::Env("BSCSCAN_API_KEY")),
    (SupportedChainId::EthereumMainnet, KeySource::Env("ETHERSCAN_API_KEY")),
    (SupportedChainId::OptimismMainnet, KeySource::Env("OPTIMISM_API_KEY")),
    (SupportedChainId::PolygonMainnet, KeySource::Env("POLYGONSCAN_API_KEY")),
    (SupportedChainId::PolygonMumbai, KeySource::Env("POLYGONSCAN_API_KEY")),
    (SupportedChainId::Sepolia, KeySource::Env("ETHERSCAN_API_KEY")),
];

/// Explorer API keys by network. An empty string means "no key required".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerApiKeys {
    keys: BTreeMap<SupportedChainId, String>,
}

impl ExplorerApiKeys {
    /// Reads the keys from the environment; unset variables become empty strings.
    pub fn from_env(env: &Env) -> Self {
        let keys = API_KEY_SOURCES
            .iter()
            .map(|(chain, source)| {
                let key = match source {
                    KeySource::Env(var) => env.get_or_empty(var),
                    KeySource::Dummy => DUMMY_API_KEY.to_string(),
                    KeySource::None => String::new(),
                };
                (*chain, key)
            })
            .collect();
        Self { keys }
    }

    pub fn from_entries<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SupportedChainId, V)>,
        V: Into<String>,
    {
        Self {
            keys: entries.into_iter().map(|(c, k)| (c, k.into())).collect(),
        }
    }

    pub fn contains(&self, chain: SupportedChainId) -> bool {
        self.keys.contains_key(&chain)
    }

    pub fn get(&self, chain: SupportedChainId) -> Option<&str> {
        self.keys.get(&chain).map(String::as_str)
    }

    /// Key table for every supported network, by network name; networks without an
    /// entry get an empty string.
    pub fn by_network_name(&self) -> BTreeMap<String, String> {
        SupportedChainId::ALL
            .into_iter()
            .map(|chain| {
                (
                    chain.name().to_string(),
                    self.get(chain).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}
