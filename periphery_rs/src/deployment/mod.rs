//! Deployment plan and sequencer for the periphery contracts.
//!
//! A [`DeploymentPlan`] is an ordered list of steps. Step ids are only handed out by
//! [`DeploymentPlan::add`], and a step may only reference ids of steps added before
//! it, so every plan is acyclic by construction. Execution walks the steps in order
//! and substitutes each reference with the address the referenced step produced.
//!
//! The periphery plan deploys, in order:
//! 1. `NFTDescriptor` (library)
//! 2. `NonfungibleTokenPositionDescriptor(wrappedNative, bytes32(symbol))`, linked to 1
//! 3. `NonfungiblePositionManager(factory, wrappedNative, 2)`
//! 4. `SwapRouter(factory, wrappedNative)`
//! 5. `V3Migrator(factory, wrappedNative, 3)`

pub mod alloy_deployer;
pub mod dry_run;

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes, TxHash, B256};
use periphery_utils::{encode_bytes32_string, MiscInfo, SupportedChainId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use crate::constants::PERIPHERY_MODULE;
use crate::error::{DeployError, PlanError};
use crate::misc::MiscInfoRegistry;

pub use alloy_deployer::AlloyDeployer;
pub use dry_run::DryRunDeployer;

pub const NFT_DESCRIPTOR_LIB: &str = "nftDescriptorLib";
pub const POSITION_DESCRIPTOR: &str = "positionDescriptor";
pub const POSITION_MANAGER: &str = "nonfungiblePositionManager";
pub const SWAP_ROUTER: &str = "swapRouter";
pub const MIGRATOR: &str = "v3Migrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ContractName {
    NftDescriptor,
    NonfungibleTokenPositionDescriptor,
    NonfungiblePositionManager,
    SwapRouter,
    V3Migrator,
}

impl ContractName {
    pub const fn artifact_name(self) -> &'static str {
        match self {
            ContractName::NftDescriptor => "NFTDescriptor",
            ContractName::NonfungibleTokenPositionDescriptor => {
                "NonfungibleTokenPositionDescriptor"
            }
            ContractName::NonfungiblePositionManager => "NonfungiblePositionManager",
            ContractName::SwapRouter => "SwapRouter",
            ContractName::V3Migrator => "V3Migrator",
        }
    }

    pub const fn source_path(self) -> &'static str {
        match self {
            ContractName::NftDescriptor => "contracts/libraries/NFTDescriptor.sol",
            ContractName::NonfungibleTokenPositionDescriptor => {
                "contracts/NonfungibleTokenPositionDescriptor.sol"
            }
            ContractName::NonfungiblePositionManager => "contracts/NonfungiblePositionManager.sol",
            ContractName::SwapRouter => "contracts/SwapRouter.sol",
            ContractName::V3Migrator => "contracts/V3Migrator.sol",
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorArg {
    Address(Address),
    Bytes32(B256),
}

impl ConstructorArg {
    fn to_sol(self) -> DynSolValue {
        match self {
            ConstructorArg::Address(address) => DynSolValue::Address(address),
            ConstructorArg::Bytes32(word) => DynSolValue::FixedBytes(word, 32),
        }
    }
}

impl fmt::Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArg::Address(address) => write!(f, "{address}"),
            ConstructorArg::Bytes32(word) => write!(f, "{word}"),
        }
    }
}

/// ABI-encodes constructor arguments as a parameter list.
pub fn encode_constructor_args(args: &[ConstructorArg]) -> Bytes {
    if args.is_empty() {
        return Bytes::new();
    }
    let values = args.iter().map(|arg| arg.to_sol()).collect();
    Bytes::from(DynSolValue::Tuple(values).abi_encode_params())
}

/// One fully resolved deployment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub key: &'static str,
    pub contract: ContractName,
    pub args: Vec<ConstructorArg>,
    /// library name -> deployed address
    pub libraries: BTreeMap<String, Address>,
}

impl DeployRequest {
    pub fn encoded_args(&self) -> Bytes {
        encode_constructor_args(&self.args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContract {
    pub key: &'static str,
    pub contract: ContractName,
    pub address: Address,
    pub tx_hash: Option<TxHash>,
}

/// Deployed contracts in deployment order, addressable by step key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployedContracts {
    contracts: Vec<DeployedContract>,
}

impl DeployedContracts {
    pub fn get(&self, key: &str) -> Option<&DeployedContract> {
        self.contracts.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeployedContract> {
        self.contracts.iter()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Addresses keyed `<module>#<step key>`.
    pub fn addresses(&self, module: &str) -> BTreeMap<String, Address> {
        self.contracts
            .iter()
            .map(|c| (format!("{module}#{}", c.key), c.address))
            .collect()
    }

    fn address_of(&self, key: &str) -> Option<Address> {
        self.get(key).map(|c| c.address)
    }
}

/// Submits a single contract creation and reports where it landed.
#[allow(async_fn_in_trait)]
pub trait ContractDeployer {
    async fn deploy(&mut self, request: &DeployRequest) -> Result<DeployedContract, DeployError>;
}

impl<D: ContractDeployer> ContractDeployer for &mut D {
    async fn deploy(&mut self, request: &DeployRequest) -> Result<DeployedContract, DeployError> {
        (**self).deploy(request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepId(usize);

impl StepId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanArg {
    Value(ConstructorArg),
    /// Address produced by an earlier step.
    Output(StepId),
}

impl From<Address> for PlanArg {
    fn from(address: Address) -> Self {
        PlanArg::Value(ConstructorArg::Address(address))
    }
}

impl From<B256> for PlanArg {
    fn from(word: B256) -> Self {
        PlanArg::Value(ConstructorArg::Bytes32(word))
    }
}

impl From<StepId> for PlanArg {
    fn from(step: StepId) -> Self {
        PlanArg::Output(step)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStep {
    pub id: StepId,
    pub key: &'static str,
    pub contract: ContractName,
    pub args: Vec<PlanArg>,
    pub libraries: Vec<(String, StepId)>,
}

impl DeploymentStep {
    fn dependencies(&self) -> impl Iterator<Item = StepId> + '_ {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                PlanArg::Output(step) => Some(*step),
                PlanArg::Value(_) => None,
            })
            .chain(self.libraries.iter().map(|(_, step)| *step))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    pub module: &'static str,
    pub chain: SupportedChainId,
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    pub fn new(module: &'static str, chain: SupportedChainId) -> Self {
        Self {
            module,
            chain,
            steps: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        key: &'static str,
        contract: ContractName,
        args: Vec<PlanArg>,
    ) -> Result<StepId, PlanError> {
        self.add_linked(key, contract, args, Vec::new())
    }

    /// Adds a step whose bytecode links the given libraries.
    ///
    /// Every referenced step must already be in the plan.
    pub fn add_linked(
        &mut self,
        key: &'static str,
        contract: ContractName,
        args: Vec<PlanArg>,
        libraries: Vec<(&str, StepId)>,
    ) -> Result<StepId, PlanError> {
        if self.steps.iter().any(|s| s.key == key) {
            return Err(PlanError::DuplicateKey(key));
        }

        let id = StepId(self.steps.len());
        let step = DeploymentStep {
            id,
            key,
            contract,
            args,
            libraries: libraries
                .into_iter()
                .map(|(name, step)| (name.to_string(), step))
                .collect(),
        };

        if let Some(bad) = step.dependencies().find(|dep| dep.0 >= id.0) {
            return Err(PlanError::ForwardReference {
                step: key,
                reference: bad.0,
            });
        }

        self.steps.push(step);
        Ok(id)
    }

    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    fn resolve(&self, step: &DeploymentStep, done: &DeployedContracts) -> DeployRequest {
        // Steps only reference earlier steps, which are all in `done` by now.
        let output = |id: StepId| done.contracts[id.0].address;

        DeployRequest {
            key: step.key,
            contract: step.contract,
            args: step
                .args
                .iter()
                .map(|arg| match arg {
                    PlanArg::Value(value) => *value,
                    PlanArg::Output(id) => ConstructorArg::Address(output(*id)),
                })
                .collect(),
            libraries: step
                .libraries
                .iter()
                .map(|(name, id)| (name.clone(), output(*id)))
                .collect(),
        }
    }

    /// Runs every step in order; stops at the first failure.
    pub async fn execute<D: ContractDeployer>(
        &self,
        mut deployer: D,
    ) -> Result<DeployedContracts, DeployError> {
        let mut done = DeployedContracts::default();

        for step in &self.steps {
            let request = self.resolve(step, &done);
            info!(
                "[{}/{}] Deploying {} ({}) on {}",
                step.id.0 + 1,
                self.steps.len(),
                step.key,
                step.contract,
                self.chain
            );

            let deployed = deployer.deploy(&request).await?;
            info!("{} deployed at {}", step.contract, deployed.address);
            done.contracts.push(deployed);
        }

        Ok(done)
    }
}

/// The periphery plan for one network.
pub fn periphery_plan(
    chain: SupportedChainId,
    info: &MiscInfo,
) -> Result<DeploymentPlan, PlanError> {
    let factory = info.pool_factory;
    let wrapped_native = info.wrapped_native;
    let symbol = encode_bytes32_string(&info.wrapped_native_symbol);

    let mut plan = DeploymentPlan::new(PERIPHERY_MODULE, chain);

    let library = plan.add(NFT_DESCRIPTOR_LIB, ContractName::NftDescriptor, vec![])?;
    let descriptor = plan.add_linked(
        POSITION_DESCRIPTOR,
        ContractName::NonfungibleTokenPositionDescriptor,
        vec![wrapped_native.into(), symbol.into()],
        vec![(ContractName::NftDescriptor.artifact_name(), library)],
    )?;
    let manager = plan.add(
        POSITION_MANAGER,
        ContractName::NonfungiblePositionManager,
        vec![factory.into(), wrapped_native.into(), descriptor.into()],
    )?;
    plan.add(
        SWAP_ROUTER,
        ContractName::SwapRouter,
        vec![factory.into(), wrapped_native.into()],
    )?;
    plan.add(
        MIGRATOR,
        ContractName::V3Migrator,
        vec![factory.into(), wrapped_native.into(), manager.into()],
    )?;

    Ok(plan)
}

/// Addresses of a completed periphery deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeripheryDeployment {
    pub chain: SupportedChainId,
    pub nft_descriptor_lib: Address,
    pub position_descriptor: Address,
    pub position_manager: Address,
    pub swap_router: Address,
    pub migrator: Address,
    #[serde(skip)]
    pub contracts: DeployedContracts,
}

impl PeripheryDeployment {
    fn from_contracts(
        chain: SupportedChainId,
        contracts: DeployedContracts,
    ) -> Result<Self, DeployError> {
        let address = |key: &'static str| {
            contracts
                .address_of(key)
                .ok_or(DeployError::MissingOutput(key))
        };
        Ok(Self {
            chain,
            nft_descriptor_lib: address(NFT_DESCRIPTOR_LIB)?,
            position_descriptor: address(POSITION_DESCRIPTOR)?,
            position_manager: address(POSITION_MANAGER)?,
            swap_router: address(SWAP_ROUTER)?,
            migrator: address(MIGRATOR)?,
            contracts,
        })
    }
}

/// Deploys the periphery suite to `chain`.
///
/// The misc info lookup happens before the deployer is touched: a network without an
/// entry fails without any deployment call.
pub async fn deploy_periphery<D: ContractDeployer>(
    chain: SupportedChainId,
    registry: &MiscInfoRegistry,
    deployer: D,
) -> Result<PeripheryDeployment, DeployError> {
    let info = registry.require(chain)?;
    info!(
        "Deploying periphery on {} (chain {}): factory={}, wrapped native={} ({})",
        chain,
        chain.id(),
        info.pool_factory,
        info.wrapped_native,
        info.wrapped_native_symbol
    );

    let plan = periphery_plan(chain, info)?;
    let contracts = plan.execute(deployer).await?;
    PeripheryDeployment::from_contracts(chain, contracts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use periphery_utils::decode_bytes32_string;

    #[derive(Default)]
    struct MockDeployer {
        calls: Vec<DeployRequest>,
        fail_on: Option<ContractName>,
    }

    impl ContractDeployer for MockDeployer {
        async fn deploy(
            &mut self,
            request: &DeployRequest,
        ) -> Result<DeployedContract, DeployError> {
            self.calls.push(request.clone());
            if self.fail_on == Some(request.contract) {
                return Err(DeployError::Connection("mock failure".to_string()));
            }
            Ok(DeployedContract {
                key: request.key,
                contract: request.contract,
                address: Address::with_last_byte(self.calls.len() as u8),
                tx_hash: None,
            })
        }
    }

    fn ink_info() -> MiscInfo {
        MiscInfo {
            pool_factory: address!("cfEA11557Bc9cB71bc6916e09fC8493D668b8d53"),
            wrapped_native: address!("4200000000000000000000000000000000000006"),
            wrapped_native_symbol: "WETH9".to_string(),
        }
    }

    fn position(calls: &[DeployRequest], contract: ContractName) -> usize {
        calls.iter().position(|c| c.contract == contract).unwrap()
    }

    #[tokio::test]
    async fn deploys_five_contracts_in_dependency_order() {
        let mut mock = MockDeployer::default();
        let deployment =
            deploy_periphery(SupportedChainId::InkSepolia, &MiscInfoRegistry::builtin(), &mut mock)
                .await
                .unwrap();

        let calls = &mock.calls;
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls.iter().map(|c| c.contract).collect::<Vec<_>>(),
            vec![
                ContractName::NftDescriptor,
                ContractName::NonfungibleTokenPositionDescriptor,
                ContractName::NonfungiblePositionManager,
                ContractName::SwapRouter,
                ContractName::V3Migrator,
            ]
        );
        assert!(
            position(calls, ContractName::NonfungibleTokenPositionDescriptor)
                < position(calls, ContractName::NonfungiblePositionManager)
        );
        assert!(
            position(calls, ContractName::NonfungiblePositionManager)
                < position(calls, ContractName::V3Migrator)
        );

        assert_eq!(deployment.nft_descriptor_lib, Address::with_last_byte(1));
        assert_eq!(deployment.position_descriptor, Address::with_last_byte(2));
        assert_eq!(deployment.position_manager, Address::with_last_byte(3));
        assert_eq!(deployment.swap_router, Address::with_last_byte(4));
        assert_eq!(deployment.migrator, Address::with_last_byte(5));
        assert_eq!(deployment.contracts.len(), 5);
    }

    #[tokio::test]
    async fn wires_constructor_arguments() {
        let info = ink_info();
        let mut mock = MockDeployer::default();
        periphery_plan(SupportedChainId::InkSepolia, &info)
            .unwrap()
            .execute(&mut mock)
            .await
            .unwrap();

        let calls = &mock.calls;
        assert!(calls[0].args.is_empty());
        assert!(calls[0].libraries.is_empty());

        let descriptor = &calls[1];
        assert_eq!(descriptor.args[0], ConstructorArg::Address(info.wrapped_native));
        assert_eq!(
            descriptor.args[1],
            ConstructorArg::Bytes32(encode_bytes32_string("WETH9"))
        );
        match descriptor.args[1] {
            ConstructorArg::Bytes32(word) => assert_eq!(decode_bytes32_string(&word), "WETH9"),
            other => panic!("unexpected argument {other:?}"),
        }
        assert_eq!(
            descriptor.libraries.get("NFTDescriptor"),
            Some(&Address::with_last_byte(1))
        );

        assert_eq!(
            calls[2].args,
            vec![
                ConstructorArg::Address(info.pool_factory),
                ConstructorArg::Address(info.wrapped_native),
                ConstructorArg::Address(Address::with_last_byte(2)),
            ]
        );
        assert_eq!(
            calls[3].args,
            vec![
                ConstructorArg::Address(info.pool_factory),
                ConstructorArg::Address(info.wrapped_native),
            ]
        );
        assert_eq!(
            calls[4].args,
            vec![
                ConstructorArg::Address(info.pool_factory),
                ConstructorArg::Address(info.wrapped_native),
                ConstructorArg::Address(Address::with_last_byte(3)),
            ]
        );
    }

    #[tokio::test]
    async fn missing_misc_info_aborts_before_any_call() {
        let mut mock = MockDeployer::default();
        let err = deploy_periphery(
            SupportedChainId::EthereumMainnet,
            &MiscInfoRegistry::builtin(),
            &mut mock,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DeployError::MissingMiscInfo(SupportedChainId::EthereumMainnet)
        ));
        assert!(mock.calls.is_empty());
    }

    #[tokio::test]
    async fn failure_stops_the_sequence() {
        let mut mock = MockDeployer {
            fail_on: Some(ContractName::NonfungiblePositionManager),
            ..Default::default()
        };
        let result =
            deploy_periphery(SupportedChainId::InkSepolia, &MiscInfoRegistry::builtin(), &mut mock)
                .await;

        assert!(result.is_err());
        assert_eq!(mock.calls.len(), 3);
        assert!(mock
            .calls
            .iter()
            .all(|c| c.contract != ContractName::V3Migrator));
    }

    #[test]
    fn rejects_reference_to_later_step() {
        let mut plan = DeploymentPlan::new("Test", SupportedChainId::Hardhat);
        let first = plan.add("first", ContractName::NftDescriptor, vec![]).unwrap();

        let err = plan
            .add("second", ContractName::SwapRouter, vec![StepId(1).into()])
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::ForwardReference {
                step: "second",
                reference: 1
            }
        );

        let err = plan
            .add_linked(
                "third",
                ContractName::NonfungibleTokenPositionDescriptor,
                vec![],
                vec![("NFTDescriptor", StepId(7))],
            )
            .unwrap_err();
        assert!(matches!(err, PlanError::ForwardReference { reference: 7, .. }));

        assert!(plan
            .add("ok", ContractName::SwapRouter, vec![first.into()])
            .is_ok());
        assert_eq!(plan.steps().len(), 2);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let mut plan = DeploymentPlan::new("Test", SupportedChainId::Hardhat);
        plan.add("lib", ContractName::NftDescriptor, vec![]).unwrap();
        assert_eq!(
            plan.add("lib", ContractName::NftDescriptor, vec![]),
            Err(PlanError::DuplicateKey("lib"))
        );
    }

    #[test]
    fn encodes_descriptor_arguments() {
        let info = ink_info();
        let encoded = encode_constructor_args(&[
            ConstructorArg::Address(info.wrapped_native),
            ConstructorArg::Bytes32(encode_bytes32_string(&info.wrapped_native_symbol)),
        ]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[12..32], info.wrapped_native.as_slice());
        assert_eq!(&encoded[32..37], b"WETH9");
        assert!(encoded[37..].iter().all(|b| *b == 0));
        assert!(encode_constructor_args(&[]).is_empty());
    }

    #[test]
    fn addresses_are_keyed_by_module() {
        let contracts = DeployedContracts {
            contracts: vec![DeployedContract {
                key: SWAP_ROUTER,
                contract: ContractName::SwapRouter,
                address: Address::with_last_byte(9),
                tx_hash: None,
            }],
        };
        let addresses = contracts.addresses(PERIPHERY_MODULE);
        assert_eq!(
            addresses.get("UniswapV3Periphery#swapRouter"),
            Some(&Address::with_last_byte(9))
        );
    }
}
