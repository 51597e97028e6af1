//! Per-network inputs to the periphery deployment.

use crate::chains::SupportedChainId;
use crate::constants::{INK_SEPOLIA_POOL_FACTORY, OP_STACK_WETH9, WETH9_SYMBOL};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Addresses and labels the periphery constructors need on a given network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscInfo {
    /// The core pool factory.
    pub pool_factory: Address,
    pub wrapped_native: Address,
    pub wrapped_native_symbol: String,
}

/// Returns the built-in entry for `chain`, if one exists.
pub fn misc_info(chain: SupportedChainId) -> Option<MiscInfo> {
    match chain {
        SupportedChainId::InkSepolia => Some(MiscInfo {
            pool_factory: INK_SEPOLIA_POOL_FACTORY,
            wrapped_native: OP_STACK_WETH9,
            wrapped_native_symbol: WETH9_SYMBOL.to_string(),
        }),
        _ => None,
    }
}
