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
//! Static data for the periphery deployer.
//!
//! This crate holds the closed network enumeration, the per-chain address table and
//! the `bytes32` string encoding. It performs no I/O.

/// Supported networks and their defaults
pub mod chains;

/// Per-chain contract addresses
pub mod constants;

/// `bytes32` string encoding
pub mod encoding;

/// Deployment inputs per network
pub mod misc;

pub use chains::{SupportedChainId, UnknownChain};
pub use encoding::{decode_bytes32_string, encode_bytes32_string};
pub use misc::{misc_info, MiscInfo};
