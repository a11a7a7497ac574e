// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

use crate::progress::StepName;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Chain not supported: {chain}")]
    UnsupportedChain { chain: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("User rejected transaction: {0}")]
    UserRejected(String),

    /// Display reads "`<Step> step failed: <reason>`".
    #[error("{step} step failed: {reason}")]
    StepFailed { step: StepName, reason: String },

    /// Opaque failure reported by a transfer engine.
    #[error("{0}")]
    Engine(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Timeout waiting for attestation")]
    AttestationTimeout,

    /// Iris answered 404; the burn is not indexed yet.
    #[error("Attestation not found")]
    AttestationNotFound,

    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unit conversion error: {0}")]
    Units(#[from] alloy_primitives::utils::UnitsError),
}

impl BridgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<alloy_contract::Error> for BridgeError {
    fn from(error: alloy_contract::Error) -> Self {
        Self::ContractCall(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_step_failure_message() {
        let error = BridgeError::StepFailed {
            step: StepName::Mint,
            reason: "insufficient funds for gas".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Mint step failed: insufficient funds for gas"
        );
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let error = BridgeError::validation("Wallet not connected");
        assert_eq!(error.to_string(), "Wallet not connected");
    }
}
