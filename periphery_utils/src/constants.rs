//! Per-chain addresses of contracts the periphery suite depends on but does not deploy.

use alloy_primitives::{address, Address};

/// The core pool factory on Ink Sepolia.
pub const INK_SEPOLIA_POOL_FACTORY: Address = address!("cfEA11557Bc9cB71bc6916e09fC8493D668b8d53");

/// WETH9 predeploy shared by OP Stack chains.
pub const OP_STACK_WETH9: Address = address!("4200000000000000000000000000000000000006");

pub const WETH9_SYMBOL: &str = "WETH9";

/// Width of a Solidity `bytes32` value.
pub const BYTES32_WIDTH: usize = 32;
