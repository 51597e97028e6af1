//! Environment variable names, timeouts and account defaults shared by the builder and the deployer.

use std::time::Duration;

/// Hosted RPC provider API key. Mandatory.
pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
/// Deployer private key. Takes precedence over [`MNEMONIC`].
pub const DEPLOYER_PK: &str = "DEPLOYER_PK";
pub const MNEMONIC: &str = "MNEMONIC";
/// Interpolated into the opBNB explorer API URL.
pub const NODEREAL_API_KEY: &str = "NODEREAL_API_KEY";

/// Hosted provider domain, as in `https://{network}.infura.io/v3/{key}`.
pub const HOSTED_PROVIDER: &str = "infura";

/// Request timeout applied to every network endpoint.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout the RPC tooling falls back to when none is configured.
pub const FRAMEWORK_DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0";
pub const MNEMONIC_ACCOUNT_COUNT: u32 = 10;
pub const LOCAL_ACCOUNT_COUNT: u32 = 20;

/// Well-known development mnemonic used by local nodes.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

pub const DEFAULT_NETWORK: &str = "hardhat";
pub const DEPLOYER_ROLE: &str = "deployer";

/// Module name used to key deployed addresses.
pub const PERIPHERY_MODULE: &str = "UniswapV3Periphery";
