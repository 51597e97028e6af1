//! Error types for configuration, integrity checking, planning and deployment.

use alloy::primitives::TxHash;
use periphery_utils::{SupportedChainId, UnknownChain};
use std::path::PathBuf;
use thiserror::Error;

use crate::deployment::ContractName;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please set {0} in your environment or .env file")]
    MissingEnv(&'static str),

    #[error("Please set DEPLOYER_PK or MNEMONIC in your environment or .env file")]
    MissingCredentials,

    #[error("Invalid chain id: {0}")]
    UnknownChainId(#[from] UnknownChain),

    #[error("Failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Failed to read misc info file {path}: {source}")]
    MiscInfoIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse misc info: {0}")]
    MiscInfoParse(#[from] toml::de::Error),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Explorer API key for {chain} is missing")]
    MissingApiKey { chain: SupportedChainId },
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid deployer private key: {0}")]
    PrivateKey(String),

    #[error("Failed to derive account {index} from mnemonic: {reason}")]
    Mnemonic { index: u32, reason: String },

    #[error("Account strategy resolved to no signers")]
    NoSigners,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Step '{step}' references step #{reference}, which is not defined before it")]
    ForwardReference { step: &'static str, reference: usize },

    #[error("Step key '{0}' is defined twice")]
    DuplicateKey(&'static str),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact {contract} references library {library}, which was not provided")]
    UnlinkedLibrary { contract: String, library: String },

    #[error("Link reference for {library} at byte {start} is outside the bytecode of {contract}")]
    LinkOutOfRange {
        contract: String,
        library: String,
        start: usize,
    },

    #[error("Invalid bytecode in artifact {contract}: {reason}")]
    Bytecode { contract: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("No pool factory / wrapped native configuration for {0}")]
    MissingMiscInfo(SupportedChainId),

    #[error("Network {0} is not configured")]
    UnknownNetwork(SupportedChainId),

    #[error("RPC endpoint reports chain id {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("Invalid RPC URL for {network}: {source}")]
    InvalidUrl {
        network: SupportedChainId,
        #[source]
        source: url::ParseError,
    },

    #[error("RPC error while deploying {contract}: {message}")]
    Rpc {
        contract: ContractName,
        message: String,
    },

    #[error("RPC error: {0}")]
    Connection(String),

    #[error("Deployment of {contract} reverted in transaction {tx_hash}")]
    Reverted {
        contract: ContractName,
        tx_hash: TxHash,
    },

    #[error("Receipt for {contract} ({tx_hash}) carries no contract address")]
    NoContractAddress {
        contract: ContractName,
        tx_hash: TxHash,
    },

    #[error("Deployment finished without an address for step '{0}'")]
    MissingOutput(&'static str),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Account(#[from] AccountError),
}
