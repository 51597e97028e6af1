//! Offline deployer: predicts CREATE addresses from a deployer address and nonce.

use alloy::primitives::Address;
use tracing::info;

use super::{ContractDeployer, DeployRequest, DeployedContract};
use crate::artifacts::ArtifactStore;
use crate::error::DeployError;

#[derive(Debug, Clone)]
pub struct DryRunDeployer {
    deployer: Address,
    nonce: u64,
    artifacts: Option<ArtifactStore>,
    requests: Vec<DeployRequest>,
}

impl DryRunDeployer {
    pub fn new(deployer: Address, nonce: u64) -> Self {
        Self {
            deployer,
            nonce,
            artifacts: None,
            requests: Vec::new(),
        }
    }

    /// Also links every artifact and appends its constructor arguments, so missing or
    /// malformed artifacts surface without a node.
    pub fn with_artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn requests(&self) -> &[DeployRequest] {
        &self.requests
    }
}

impl ContractDeployer for DryRunDeployer {
    async fn deploy(&mut self, request: &DeployRequest) -> Result<DeployedContract, DeployError> {
        if let Some(artifacts) = &self.artifacts {
            let code = artifacts
                .load(request.contract)?
                .deploy_code(&request.libraries, &request.encoded_args())?;
            info!("[dry-run] {} creation code: {} bytes", request.contract, code.len());
        }

        let address = self.deployer.create(self.nonce);
        self.nonce += 1;
        self.requests.push(request.clone());

        Ok(DeployedContract {
            key: request.key,
            contract: request.contract,
            address,
            tx_hash: None,
        })
    }
}
