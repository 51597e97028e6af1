//! Chain registry: the closed set of networks the periphery suite is deployed to.
//!
//! Every network is identified by its EIP-155 chain id. The registry pairs each id
//! with the network name used as a configuration key, a public default RPC URL,
//! and whether the hosted RPC provider serves it under that name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a raw chain id or name does not belong to [`SupportedChainId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownChain {
    #[error("unsupported chain id {0}")]
    Id(u64),
    #[error("unsupported network '{0}'")]
    Name(String),
}

/// Networks with a known configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
#[repr(u64)]
pub enum SupportedChainId {
    EthereumMainnet = 1,
    Sepolia = 11155111,
    ArbitrumMainnet = 42161,
    AvalancheMainnet = 43114,
    BscMainnet = 56,
    OptimismMainnet = 10,
    PolygonMainnet = 137,
    PolygonMumbai = 80001,
    BaseMainnet = 8453,
    BlastMainnet = 81457,
    CeloMainnet = 42220,
    LineaMainnet = 59144,
    MantleMainnet = 5000,
    ScrollMainnet = 534352,
    OpbnbMainnet = 204,
    FlareMainnet = 14,
    EvmosMainnet = 9001,
    ArtheraMainnet = 10242,
    ArtheraTestnet = 10243,
    KavaMainnet = 2222,
    InkSepolia = 763373,
    PolygonZkevm = 1101,
    FantomMainnet = 250,
    X1Testnet = 195,
    TaikoHekla = 167009,
    SkaleEuropa = 2046399126,
    Haven1Devnet = 8110,
    BerachainBartio = 80084,
    Hardhat = 31337,
    Ganache = 1337,
}

impl SupportedChainId {
    /// All supported networks, in registry order.
    pub const ALL: [SupportedChainId; 30] = [
        SupportedChainId::EthereumMainnet,
        SupportedChainId::Sepolia,
        SupportedChainId::ArbitrumMainnet,
        SupportedChainId::AvalancheMainnet,
        SupportedChainId::BscMainnet,
        SupportedChainId::OptimismMainnet,
        SupportedChainId::PolygonMainnet,
        SupportedChainId::PolygonMumbai,
        SupportedChainId::BaseMainnet,
        SupportedChainId::BlastMainnet,
        SupportedChainId::CeloMainnet,
        SupportedChainId::LineaMainnet,
        SupportedChainId::MantleMainnet,
        SupportedChainId::ScrollMainnet,
        SupportedChainId::OpbnbMainnet,
        SupportedChainId::FlareMainnet,
        SupportedChainId::EvmosMainnet,
        SupportedChainId::ArtheraMainnet,
        SupportedChainId::ArtheraTestnet,
        SupportedChainId::KavaMainnet,
        SupportedChainId::InkSepolia,
        SupportedChainId::PolygonZkevm,
        SupportedChainId::FantomMainnet,
        SupportedChainId::X1Testnet,
        SupportedChainId::TaikoHekla,
        SupportedChainId::SkaleEuropa,
        SupportedChainId::Haven1Devnet,
        SupportedChainId::BerachainBartio,
        SupportedChainId::Hardhat,
        SupportedChainId::Ganache,
    ];

    pub const fn id(self) -> u64 {
        self as u64
    }

    /// Network name, used as the key in the network and explorer tables and as the
    /// hosted provider's subdomain.
    pub const fn name(self) -> &'static str {
        match self {
            SupportedChainId::EthereumMainnet => "mainnet",
            SupportedChainId::Sepolia => "sepolia",
            SupportedChainId::ArbitrumMainnet => "arbitrum-mainnet",
            SupportedChainId::AvalancheMainnet => "avalanche-mainnet",
            SupportedChainId::BscMainnet => "bsc-mainnet",
            SupportedChainId::OptimismMainnet => "optimism-mainnet",
            SupportedChainId::PolygonMainnet => "polygon-mainnet",
            SupportedChainId::PolygonMumbai => "polygon-mumbai",
            SupportedChainId::BaseMainnet => "base-mainnet",
            SupportedChainId::BlastMainnet => "blast-mainnet",
            SupportedChainId::CeloMainnet => "celo-mainnet",
            SupportedChainId::LineaMainnet => "linea-mainnet",
            SupportedChainId::MantleMainnet => "mantle-mainnet",
            SupportedChainId::ScrollMainnet => "scroll-mainnet",
            SupportedChainId::OpbnbMainnet => "opbnb-mainnet",
            SupportedChainId::FlareMainnet => "flare-mainnet",
            SupportedChainId::EvmosMainnet => "evmos-mainnet",
            SupportedChainId::ArtheraMainnet => "arthera-mainnet",
            SupportedChainId::ArtheraTestnet => "arthera-testnet",
            SupportedChainId::KavaMainnet => "kava-mainnet",
            SupportedChainId::InkSepolia => "ink-sepolia",
            SupportedChainId::PolygonZkevm => "polygon-zkevm",
            SupportedChainId::FantomMainnet => "fantom-mainnet",
            SupportedChainId::X1Testnet => "x1-testnet",
            SupportedChainId::TaikoHekla => "taiko-hekla",
            SupportedChainId::SkaleEuropa => "skale-europa",
            SupportedChainId::Haven1Devnet => "haven1-devnet",
            SupportedChainId::BerachainBartio => "berachain-bartio",
            SupportedChainId::Hardhat => "hardhat",
            SupportedChainId::Ganache => "ganache",
        }
    }

    /// Public RPC endpoint used when the hosted provider does not serve the network.
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            SupportedChainId::EthereumMainnet => "https://eth.llamarpc.com",
            SupportedChainId::Sepolia => "https://rpc.sepolia.org",
            SupportedChainId::ArbitrumMainnet => "https://arb1.arbitrum.io/rpc",
            SupportedChainId::AvalancheMainnet => "https://api.avax.network/ext/bc/C/rpc",
            SupportedChainId::BscMainnet => "https://bsc-dataseed.binance.org",
            SupportedChainId::OptimismMainnet => "https://mainnet.optimism.io",
            SupportedChainId::PolygonMainnet => "https://polygon-rpc.com",
            SupportedChainId::PolygonMumbai => "https://rpc-mumbai.maticvigil.com",
            SupportedChainId::BaseMainnet => "https://mainnet.base.org",
            SupportedChainId::BlastMainnet => "https://rpc.blast.io",
            SupportedChainId::CeloMainnet => "https://forno.celo.org",
            SupportedChainId::LineaMainnet => "https://rpc.linea.build",
            SupportedChainId::MantleMainnet => "https://rpc.mantle.xyz",
            SupportedChainId::ScrollMainnet => "https://rpc.scroll.io",
            SupportedChainId::OpbnbMainnet => "https://opbnb-mainnet-rpc.bnbchain.org",
            SupportedChainId::FlareMainnet => "https://flare-api.flare.network/ext/C/rpc",
            SupportedChainId::EvmosMainnet => "https://evmos-evm.publicnode.com",
            SupportedChainId::ArtheraMainnet => "https://rpc.arthera.net",
            SupportedChainId::ArtheraTestnet => "https://rpc-test.arthera.net",
            SupportedChainId::KavaMainnet => "https://evm.kava.io",
            SupportedChainId::InkSepolia => "https://rpc-gel-sepolia.inkonchain.com",
            SupportedChainId::PolygonZkevm => "https://zkevm-rpc.com",
            SupportedChainId::FantomMainnet => "https://rpcapi.fantom.network",
            SupportedChainId::X1Testnet => "https://testrpc.xlayer.tech",
            SupportedChainId::TaikoHekla => "https://rpc.hekla.taiko.xyz",
            SupportedChainId::SkaleEuropa => "https://mainnet.skalenodes.com/v1/elated-tan-skat",
            SupportedChainId::Haven1Devnet => "https://rpc.staging.haven1.org",
            SupportedChainId::BerachainBartio => "https://bartio.rpc.berachain.com",
            SupportedChainId::Hardhat => "http://127.0.0.1:8545",
            SupportedChainId::Ganache => "http://localhost:8545",
        }
    }

    /// Whether the hosted RPC provider serves this network under [`Self::name`].
    pub const fn is_hosted(self) -> bool {
        matches!(
            self,
            SupportedChainId::EthereumMainnet
                | SupportedChainId::Sepolia
                | SupportedChainId::ArbitrumMainnet
                | SupportedChainId::AvalancheMainnet
                | SupportedChainId::BscMainnet
                | SupportedChainId::OptimismMainnet
                | SupportedChainId::PolygonMainnet
                | SupportedChainId::PolygonMumbai
                | SupportedChainId::BaseMainnet
                | SupportedChainId::BlastMainnet
                | SupportedChainId::CeloMainnet
                | SupportedChainId::LineaMainnet
                | SupportedChainId::MantleMainnet
                | SupportedChainId::ScrollMainnet
                | SupportedChainId::OpbnbMainnet
        )
    }

    /// Development networks running on the local machine.
    pub const fn is_local(self) -> bool {
        matches!(self, SupportedChainId::Hardhat | SupportedChainId::Ganache)
    }
}

impl TryFrom<u64> for SupportedChainId {
    type Error = UnknownChain;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        SupportedChainId::ALL
            .into_iter()
            .find(|chain| chain.id() == value)
            .ok_or(UnknownChain::Id(value))
    }
}

impl From<SupportedChainId> for u64 {
    fn from(chain: SupportedChainId) -> Self {
        chain.id()
    }
}

impl FromStr for SupportedChainId {
    type Err = UnknownChain;

    /// Accepts a network name (`ink-sepolia`) or a decimal chain id (`763373`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u64>() {
            return SupportedChainId::try_from(id);
        }
        SupportedChainId::ALL
            .into_iter()
            .find(|chain| chain.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownChain::Name(s.to_string()))
    }
}

impl fmt::Display for SupportedChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
