// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Runtime configuration read from the environment.

use std::env;
use url::Url;

use crate::chain::Chain;
use crate::engine::TransferSpeed;
use crate::error::{BridgeError, Result};

/// Circle Iris attestation API environments.
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v2 messages path: `/v2/messages/{sourceDomain}?transactionHash={txHash}`
pub const MESSAGES_PATH_V2: &str = "/v2/messages/";

/// CCTP v2 burn fee path: `/v2/burn/USDC/fees/{sourceDomain}/{destDomain}`
pub const BURN_FEES_PATH_V2: &str = "/v2/burn/USDC/fees/";

pub const WALLETCONNECT_PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";
pub const IRIS_API_URL_ENV: &str = "IRIS_API_URL";

/// Whether the interactive front end may talk to wallets at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletConnectivity {
    Enabled { project_id: String },
    /// No project identifier configured; only the informational page is shown.
    Disabled,
}

impl WalletConnectivity {
    pub fn from_project_id(project_id: Option<String>) -> Self {
        match project_id.map(|id| id.trim().to_string()) {
            Some(project_id) if !project_id.is_empty() => Self::Enabled { project_id },
            _ => Self::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub wallet_connectivity: WalletConnectivity,
    pub ethereum_sepolia_rpc: Url,
    pub arc_testnet_rpc: Url,
    pub iris_api: Url,
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    ///
    /// Callers that want `.env` support load it with `dotenvy` first.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url_or_default = |key: &str, default: &str| -> Result<Url> {
            let raw = lookup(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw)
                .map_err(|e| BridgeError::InvalidConfig(format!("{key} is not a valid URL: {e}")))
        };

        Ok(Self {
            wallet_connectivity: WalletConnectivity::from_project_id(lookup(
                WALLETCONNECT_PROJECT_ID_ENV,
            )),
            ethereum_sepolia_rpc: url_or_default(
                Chain::EthereumSepolia.rpc_url_env(),
                Chain::EthereumSepolia.default_rpc_url(),
            )?,
            arc_testnet_rpc: url_or_default(
                Chain::ArcTestnet.rpc_url_env(),
                Chain::ArcTestnet.default_rpc_url(),
            )?,
            iris_api: url_or_default(IRIS_API_URL_ENV, IRIS_API_SANDBOX)?,
        })
    }

    pub fn rpc_url(&self, chain: Chain) -> &Url {
        match chain {
            Chain::EthereumSepolia => &self.ethereum_sepolia_rpc,
            Chain::ArcTestnet => &self.arc_testnet_rpc,
        }
    }
}

/// Controls how the engine polls the attestation service.
///
/// ```rust
/// use arc_bridge::PollingConfig;
///
/// let config = PollingConfig::default()
///     .with_max_attempts(20)
///     .with_poll_interval_secs(30);
/// assert_eq!(config.total_timeout_secs(), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub max_attempts: u32,
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    /// 30 attempts one minute apart, enough for standard (finalized) transfers.
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval_secs: 60,
        }
    }
}

impl PollingConfig {
    /// 30 attempts five seconds apart.
    pub fn fast_transfer() -> Self {
        Self {
            max_attempts: 30,
            poll_interval_secs: 5,
        }
    }

    pub fn for_speed(speed: TransferSpeed) -> Self {
        match speed {
            TransferSpeed::Fast => Self::fast_transfer(),
            TransferSpeed::Slow => Self::default(),
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn total_timeout_secs(&self) -> u64 {
        self.max_attempts as u64 * self.poll_interval_secs
    }
}
