//! Command implementations shared by the binary and its tests.

use eyre::{eyre, Result, WrapErr};
use periphery_rs::constants::PERIPHERY_MODULE;
use periphery_rs::explorers::{ExplorerApiKeys, ExplorerRegistry};
use periphery_rs::{
    deploy_periphery, verify_config_integrity, ContractDeployer, DeployConfig, Env,
    MiscInfoRegistry, PeripheryDeployment,
};
use periphery_utils::SupportedChainId;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::journal::{DeploymentJournal, JournaledDeployer};

/// Reads `.env` (or the given file) and the process environment.
pub fn load_env(env_file: Option<&Path>) -> Result<Env> {
    match env_file {
        Some(path) => Ok(Env::load_from(path)?),
        None => Ok(Env::load()),
    }
}

/// Loads the configuration with the built-in explorer tables.
pub fn load_config(env: &Env) -> Result<DeployConfig> {
    DeployConfig::load(env).wrap_err("Failed to load deployment configuration")
}

/// Runs only the explorer integrity check.
pub fn check(env: &Env) -> Result<usize> {
    let registry = ExplorerRegistry::from_env(env);
    let keys = ExplorerApiKeys::from_env(env);
    verify_config_integrity(&registry, &keys)?;
    info!("Explorer configuration OK: {} custom explorers", registry.len());
    Ok(registry.len())
}

/// One row per network: id, name, and where its RPC URL comes from.
pub fn network_rows() -> Vec<String> {
    SupportedChainId::ALL
        .into_iter()
        .map(|chain| {
            let source = if chain.is_hosted() {
                "hosted".to_string()
            } else {
                chain.default_rpc_url().to_string()
            };
            format!("{:>10}  {:<18} {}", chain.id(), chain.name(), source)
        })
        .collect()
}

pub fn load_misc_info(path: Option<&Path>) -> Result<MiscInfoRegistry> {
    let registry = MiscInfoRegistry::builtin();
    match path {
        Some(path) => Ok(registry.merge_file(path)?),
        None => Ok(registry),
    }
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub network: SupportedChainId,
    pub artifacts: PathBuf,
    pub misc_info: Option<PathBuf>,
    pub deployments_dir: PathBuf,
    pub dry_run: bool,
}

/// Deploys the periphery suite with `deployer`, journaling every step and recording
/// the resulting addresses.
///
/// With `dry_run` set, the journal and addresses go to the chain's `dry-run/`
/// subdirectory and the recorded addresses of real deployments are left alone.
pub async fn deploy_with<D: ContractDeployer>(
    config: &DeployConfig,
    network: SupportedChainId,
    misc: &MiscInfoRegistry,
    deployments_dir: &Path,
    deployer: D,
    dry_run: bool,
) -> Result<PeripheryDeployment> {
    if config.network(network).is_none() {
        return Err(eyre!("Network {} is not configured", network));
    }
    // Fail before creating the journal directory.
    misc.require(network)?;

    let journal = if dry_run {
        DeploymentJournal::open_dry_run(deployments_dir, network).await?
    } else {
        DeploymentJournal::open(deployments_dir, network).await?
    };
    let result = deploy_periphery(network, misc, JournaledDeployer::new(deployer, &journal)).await;

    let deployment = match result {
        Ok(deployment) => deployment,
        Err(e) => {
            error!("Deployment on {} failed: {}", network, e);
            journal.close().await?;
            return Err(e.into());
        }
    };

    journal
        .record_addresses(&deployment.contracts.addresses(PERIPHERY_MODULE))
        .await?;
    journal.close().await?;

    info!(
        "Periphery deployed on {}: manager={}, router={}, migrator={}",
        network, deployment.position_manager, deployment.swap_router, deployment.migrator
    );
    Ok(deployment)
}
