// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract addresses on the supported testnets
//!
//! CCTP v2 deploys TokenMessengerV2 and MessageTransmitterV2 at the same
//! address on every testnet, so only the USDC token differs per chain.

use alloy_primitives::{address, Address};

/// <https://developers.circle.com/cctp/evm-smart-contracts>
pub const CCTP_V2_TOKEN_MESSENGER_TESTNET: Address =
    address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");

/// <https://developers.circle.com/cctp/evm-smart-contracts>
pub const CCTP_V2_MESSAGE_TRANSMITTER_TESTNET: Address =
    address!("E737e5cEBEEBa77EFE34D4aa090756590b1CE275");

/// <https://sepolia.etherscan.io/address/0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238>
pub const ETHEREUM_SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

/// USDC's ERC-20 interface on Arc, where USDC is also the native gas token.
///
/// <https://testnet.arcscan.app/address/0x3600000000000000000000000000000000000000>
pub const ARC_TESTNET_USDC: Address = address!("3600000000000000000000000000000000000000");
