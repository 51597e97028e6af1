// Copyright (c) 2025 Merge Layers Inc.
//
// This source code is licensed under the Business Source License 1.1
// (the "License"); you may not use this file except in compliance with the
// License. You may obtain a copy of the License at
//
//     https://github.com/malda-protocol/malda-zk-coprocessor/blob/main/LICENSE-BSL
//
// See the License for the specific language governing permissions and
// limitations under the License.
//
//
//!
//! Configuration and deployment of the periphery contracts: network endpoints and
//! signer accounts, block explorer verification settings, compiled artifacts, and the
//! ordered deployment of the five periphery contracts.

/// Signer accounts from a private key or mnemonic
pub mod accounts;

pub mod artifacts;

/// Network endpoints, compiler profiles and the aggregate deployment configuration
pub mod config;

pub mod constants;

pub mod deployment;

/// Process environment and `.env` loading
pub mod env;

pub mod error;

/// Block explorer registry and verification keys
pub mod explorers;

pub mod integrity;

pub mod misc;

pub use config::{DeployConfig, NetworkConfigBuilder, NetworkEndpoint};
pub use deployment::{
    deploy_periphery, AlloyDeployer, ContractDeployer, DeployRequest, DeployedContract,
    DryRunDeployer, PeripheryDeployment,
};
pub use env::Env;
pub use error::{ConfigError, DeployError, IntegrityError};
pub use integrity::verify_config_integrity;
pub use misc::MiscInfoRegistry;
