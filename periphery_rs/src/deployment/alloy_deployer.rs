use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::{client::RpcClient, types::TransactionRequest},
    transports::http::{reqwest, Http},
};
use std::time::Duration;
use tracing::{debug, info};

use super::{ContractDeployer, DeployRequest, DeployedContract};
use crate::artifacts::ArtifactStore;
use crate::config::NetworkEndpoint;
use crate::error::{AccountError, DeployError};

/// Deploys contracts over JSON-RPC, signing with the endpoint's first account.
pub struct AlloyDeployer {
    provider: DynProvider,
    deployer: Address,
    artifacts: ArtifactStore,
    timeout: Duration,
}

impl AlloyDeployer {
    /// Connects to `endpoint` and checks that the node serves the expected chain.
    pub async fn connect(
        endpoint: &NetworkEndpoint,
        artifacts: ArtifactStore,
    ) -> Result<Self, DeployError> {
        let url: reqwest::Url = endpoint.url.parse().map_err(|source| DeployError::InvalidUrl {
            network: endpoint.chain_id,
            source,
        })?;

        let mut signers = endpoint.accounts.signers()?.into_iter();
        let first = signers.next().ok_or(AccountError::NoSigners)?;
        let deployer = first.address();
        let mut wallet = EthereumWallet::from(first);
        for signer in signers {
            wallet.register_signer(signer);
        }

        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| DeployError::Connection(e.to_string()))?;
        let rpc = RpcClient::new(
            Http::with_client(client, url),
            endpoint.chain_id.is_local(),
        );

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_client(rpc)
            .erased();

        let actual = provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::Connection(e.to_string()))?;
        let expected = endpoint.chain_id.id();
        if actual != expected {
            return Err(DeployError::ChainMismatch { expected, actual });
        }

        info!(
            "Connected to {} (chain {}), deployer={}",
            endpoint.name, actual, deployer
        );

        Ok(Self {
            provider,
            deployer,
            artifacts,
            timeout: endpoint.timeout,
        })
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }
}

impl ContractDeployer for AlloyDeployer {
    async fn deploy(&mut self, request: &DeployRequest) -> Result<DeployedContract, DeployError> {
        let contract = request.contract;
        let artifact = self.artifacts.load(contract)?;
        let code = artifact.deploy_code(&request.libraries, &request.encoded_args())?;

        let rpc_error = |e: &dyn std::fmt::Display| DeployError::Rpc {
            contract,
            message: e.to_string(),
        };

        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(code);

        let estimated_gas = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| rpc_error(&e))?;
        let gas_limit = estimated_gas + (estimated_gas / 2);
        debug!(
            "Estimated gas for {}: {}, using gas limit: {}",
            contract, estimated_gas, gas_limit
        );

        let pending = self
            .provider
            .send_transaction(tx.with_gas_limit(gas_limit))
            .await
            .map_err(|e| rpc_error(&e))?;
        let tx_hash = *pending.tx_hash();
        info!("Broadcast {} deployment: tx={}", contract, tx_hash);

        let receipt = pending
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|e| rpc_error(&e))?;

        if !receipt.status() {
            return Err(DeployError::Reverted { contract, tx_hash });
        }
        let address = receipt
            .contract_address
            .ok_or(DeployError::NoContractAddress { contract, tx_hash })?;

        Ok(DeployedContract {
            key: request.key,
            contract,
            address,
            tx_hash: Some(tx_hash),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::AccountStrategy;
    use crate::constants::{DEV_MNEMONIC, NETWORK_TIMEOUT};
    use crate::deployment::{ContractName, SWAP_ROUTER};
    use alloy::consensus::Transaction as _;
    use alloy::node_bindings::{Anvil, AnvilInstance};
    use periphery_utils::SupportedChainId;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    // Copies a one-byte runtime (STOP) and returns it.
    const STOP_CONTRACT: &str = "0x6001600c60003960016000f300";
    // PUSH1 0 PUSH1 0 REVERT
    const REVERTING_CONTRACT: &str = "0x60006000fd";

    fn endpoint(chain_id: SupportedChainId, url: &str) -> NetworkEndpoint {
        NetworkEndpoint {
            chain_id,
            name: chain_id.name(),
            url: url.to_string(),
            accounts: AccountStrategy::mnemonic(DEV_MNEMONIC, 2),
            timeout: NETWORK_TIMEOUT,
        }
    }

    fn spawn_anvil() -> Option<AnvilInstance> {
        match Anvil::new().chain_id(SupportedChainId::Hardhat.id()).try_spawn() {
            Ok(anvil) => Some(anvil),
            Err(e) => {
                eprintln!("skipping: anvil unavailable: {e}");
                None
            }
        }
    }

    fn artifact_root(name: &str, bytecode: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "periphery-alloy-{}-{}",
            name,
            std::process::id()
        ));
        let path = ArtifactStore::new(&root).path_for(ContractName::SwapRouter);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let json = serde_json::json!({
            "contractName": "SwapRouter",
            "abi": [],
            "bytecode": bytecode,
        });
        std::fs::write(&path, json.to_string()).unwrap();
        root
    }

    fn swap_router_request() -> DeployRequest {
        DeployRequest {
            key: SWAP_ROUTER,
            contract: ContractName::SwapRouter,
            args: vec![],
            libraries: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        let result = AlloyDeployer::connect(
            &endpoint(SupportedChainId::InkSepolia, "not a url"),
            ArtifactStore::new("artifacts"),
        )
        .await;
        assert!(matches!(
            result,
            Err(DeployError::InvalidUrl {
                network: SupportedChainId::InkSepolia,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn rejects_node_on_another_chain() {
        let Some(anvil) = spawn_anvil() else { return };
        let result = AlloyDeployer::connect(
            &endpoint(SupportedChainId::Ganache, &anvil.endpoint()),
            ArtifactStore::new("artifacts"),
        )
        .await;
        assert!(matches!(
            result,
            Err(DeployError::ChainMismatch {
                expected: 1337,
                actual: 31337
            })
        ));
    }

    #[tokio::test]
    async fn deploys_contract_and_reports_address() {
        let Some(anvil) = spawn_anvil() else { return };
        let root = artifact_root("deploy", STOP_CONTRACT);

        let mut deployer = AlloyDeployer::connect(
            &endpoint(SupportedChainId::Hardhat, &anvil.endpoint()),
            ArtifactStore::new(&root),
        )
        .await
        .unwrap();
        assert_eq!(deployer.deployer(), anvil.addresses()[0]);

        let deployed = deployer.deploy(&swap_router_request()).await.unwrap();
        assert_eq!(deployed.address, deployer.deployer().create(0));
        assert!(deployed.tx_hash.is_some());

        let code = deployer.provider.get_code_at(deployed.address).await.unwrap();
        assert_eq!(code.to_vec(), vec![0x00]);

        let tx = deployer
            .provider
            .get_transaction_by_hash(deployed.tx_hash.unwrap())
            .await
            .unwrap()
            .unwrap();
        let receipt = deployer
            .provider
            .get_transaction_receipt(deployed.tx_hash.unwrap())
            .await
            .unwrap()
            .unwrap();
        // Gas limit carries the 50% buffer over the estimate, so it exceeds what was used.
        assert!(tx.gas_limit() > receipt.gas_used);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn reverting_constructor_fails_the_step() {
        let Some(anvil) = spawn_anvil() else { return };
        let root = artifact_root("revert", REVERTING_CONTRACT);

        let mut deployer = AlloyDeployer::connect(
            &endpoint(SupportedChainId::Hardhat, &anvil.endpoint()),
            ArtifactStore::new(&root),
        )
        .await
        .unwrap();

        let err = deployer.deploy(&swap_router_request()).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Rpc {
                contract: ContractName::SwapRouter,
                ..
            } | DeployError::Reverted {
                contract: ContractName::SwapRouter,
                ..
            }
        ));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
