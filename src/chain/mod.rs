// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Chain registry
//!
//! Static configuration for the two networks this deployment bridges between:
//! Ethereum Sepolia and Arc Testnet. Each chain carries its symbolic
//! identifier, EVM chain id, CCTP domain, RPC and explorer endpoints, and the
//! USDC token address.

pub mod addresses;

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;
use addresses::{ARC_TESTNET_USDC, ETHEREUM_SEPOLIA_USDC};

/// Explorer used for identifiers that are not in the registry.
const FALLBACK_EXPLORER: &str = "https://sepolia.etherscan.io";

/// USDC uses six decimals on every CCTP chain.
pub const USDC_DECIMALS: u8 = 6;

/// A chain supported by this bridge.
///
/// # Example
///
/// ```rust
/// use arc_bridge::Chain;
///
/// let chain: Chain = "Arc_Testnet".parse().unwrap();
/// assert_eq!(chain.chain_id().id(), 5042002);
/// assert_eq!(chain.domain_id(), 26);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    #[serde(rename = "Ethereum_Sepolia")]
    EthereumSepolia,
    #[serde(rename = "Arc_Testnet")]
    ArcTestnet,
}

impl Chain {
    pub const ALL: [Chain; 2] = [Chain::EthereumSepolia, Chain::ArcTestnet];

    /// Symbolic identifier, e.g. `Ethereum_Sepolia`.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "Ethereum_Sepolia",
            Self::ArcTestnet => "Arc_Testnet",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "Ethereum Sepolia",
            Self::ArcTestnet => "Arc Testnet",
        }
    }

    /// EVM chain id, used to switch the wallet's active network.
    pub fn chain_id(self) -> alloy_chains::Chain {
        alloy_chains::Chain::from_id(match self {
            Self::EthereumSepolia => 11_155_111,
            Self::ArcTestnet => 5_042_002,
        })
    }

    /// CCTP domain: <https://developers.circle.com/cctp/supported-domains>
    pub const fn domain_id(self) -> u32 {
        match self {
            Self::EthereumSepolia => 0,
            Self::ArcTestnet => 26,
        }
    }

    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "https://ethereum-sepolia-rpc.publicnode.com",
            Self::ArcTestnet => "https://rpc.testnet.arc.network/",
        }
    }

    /// Environment variable that overrides [`default_rpc_url`](Self::default_rpc_url).
    pub const fn rpc_url_env(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "ETHEREUM_SEPOLIA_RPC_URL",
            Self::ArcTestnet => "ARC_TESTNET_RPC_URL",
        }
    }

    /// Symbol of the token that pays for gas.
    pub const fn native_symbol(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "ETH",
            Self::ArcTestnet => "USDC",
        }
    }

    pub const fn native_decimals(self) -> u8 {
        18
    }

    pub const fn usdc_address(self) -> Address {
        match self {
            Self::EthereumSepolia => ETHEREUM_SEPOLIA_USDC,
            Self::ArcTestnet => ARC_TESTNET_USDC,
        }
    }

    pub const fn explorer_url(self) -> &'static str {
        match self {
            Self::EthereumSepolia => "https://sepolia.etherscan.io",
            Self::ArcTestnet => "https://testnet.arcscan.app",
        }
    }

    pub fn tx_url(self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url())
    }

    pub fn info(self) -> ChainInfo {
        ChainInfo {
            chain: self,
            name: self.name(),
            chain_id: self.chain_id().id(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Chain {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.identifier() == s)
            .ok_or_else(|| BridgeError::UnsupportedChain {
                chain: s.to_string(),
            })
    }
}

/// Builds a block-explorer link for a transaction on the chain named by
/// `identifier`. Unknown identifiers use the Sepolia explorer.
///
/// ```rust
/// use arc_bridge::explorer_tx_url;
///
/// assert_eq!(
///     explorer_tx_url("Arc_Testnet", "0xabc"),
///     "https://testnet.arcscan.app/tx/0xabc"
/// );
/// ```
pub fn explorer_tx_url(identifier: &str, tx_hash: &str) -> String {
    let base = identifier
        .parse::<Chain>()
        .map(Chain::explorer_url)
        .unwrap_or(FALLBACK_EXPLORER);
    format!("{base}/tx/{tx_hash}")
}

/// Registry entry for a chain offered in the chain selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain: Chain,
    pub name: &'static str,
    /// EVM chain id.
    pub chain_id: u64,
}

/// Chains offered in the selectors, in registry order.
pub fn supported_chains() -> Vec<ChainInfo> {
    Chain::ALL.into_iter().map(Chain::info).collect()
}

/// Initial source and destination for the chain selectors.
///
/// Prefers Sepolia → Arc and falls back to the first two listed chains.
pub fn default_route(chains: &[ChainInfo]) -> (Option<Chain>, Option<Chain>) {
    let find = |wanted: Chain| chains.iter().find(|info| info.chain == wanted);
    let from = find(Chain::EthereumSepolia)
        .or_else(|| chains.first())
        .map(|info| info.chain);
    let to = find(Chain::ArcTestnet)
        .or_else(|| chains.get(1))
        .map(|info| info.chain);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use rstest::rstest;

    #[rstest]
    #[case("Ethereum_Sepolia", Chain::EthereumSepolia)]
    #[case("Arc_Testnet", Chain::ArcTestnet)]
    fn test_identifier_round_trip(#[case] identifier: &str, #[case] chain: Chain) {
        assert_eq!(identifier.parse::<Chain>().unwrap(), chain);
        assert_eq!(chain.to_string(), identifier);
    }

    #[test]
    fn test_unknown_identifier() {
        let result = "Base_Sepolia".parse::<Chain>();
        assert!(matches!(
            result,
            Err(BridgeError::UnsupportedChain { chain }) if chain == "Base_Sepolia"
        ));
    }

    #[test]
    fn test_chain_ids_and_domains() {
        assert_eq!(Chain::EthereumSepolia.chain_id().id(), 11_155_111);
        assert_eq!(Chain::ArcTestnet.chain_id().id(), 5_042_002);
        assert_eq!(Chain::EthereumSepolia.domain_id(), 0);
        assert_eq!(Chain::ArcTestnet.domain_id(), 26);
    }

    #[test]
    fn test_explorer_urls() {
        insta::assert_snapshot!(
            explorer_tx_url("Ethereum_Sepolia", "0xabc123"),
            @"https://sepolia.etherscan.io/tx/0xabc123"
        );
        insta::assert_snapshot!(
            explorer_tx_url("Arc_Testnet", "0xabc123"),
            @"https://testnet.arcscan.app/tx/0xabc123"
        );
        insta::assert_snapshot!(
            explorer_tx_url("Solana_Devnet", "0xabc123"),
            @"https://sepolia.etherscan.io/tx/0xabc123"
        );
    }

    #[test]
    fn test_tx_url_uses_full_hash() {
        let hash = b256!("1212121212121212121212121212121212121212121212121212121212121212");
        insta::assert_snapshot!(
            Chain::ArcTestnet.tx_url(&hash),
            @"https://testnet.arcscan.app/tx/0x1212121212121212121212121212121212121212121212121212121212121212"
        );
    }

    #[test]
    fn test_supported_chains_and_default_route() {
        let chains = supported_chains();
        assert_eq!(chains.len(), 2);
        assert_eq!(
            default_route(&chains),
            (Some(Chain::EthereumSepolia), Some(Chain::ArcTestnet))
        );
        assert_eq!(default_route(&[]), (None, None));
    }

    #[test]
    fn test_chain_info_json() {
        insta::assert_json_snapshot!(Chain::ArcTestnet.info(), @r#"
        {
          "chain": "Arc_Testnet",
          "name": "Arc Testnet",
          "chainId": 5042002
        }
        "#);
    }

    #[test]
    fn test_chain_serde_uses_identifier() {
        assert_eq!(
            serde_json::to_string(&Chain::ArcTestnet).unwrap(),
            r#""Arc_Testnet""#
        );
    }
}
