// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::{utils::format_units, Address, U256};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;

use super::TransferSpeed;
use crate::chain::Chain;
use crate::progress::StepName;

/// Serializes integers as decimal strings so JSON consumers never lose
/// precision.
fn decimal_string<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Gas cost of one transaction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFee {
    pub name: StepName,
    pub blockchain: Chain,
    #[serde(serialize_with = "decimal_string")]
    pub gas_limit: u64,
    #[serde(serialize_with = "decimal_string")]
    pub gas_price: u128,
    /// `gas_limit * gas_price`, in the chain's native base units.
    #[serde(serialize_with = "decimal_string")]
    pub fee: U256,
}

impl GasFee {
    pub fn new(name: StepName, blockchain: Chain, gas_limit: u64, gas_price: u128) -> Self {
        Self {
            name,
            blockchain,
            gas_limit,
            gas_price,
            fee: U256::from(gas_limit) * U256::from(gas_price),
        }
    }

    /// Fee in whole native units, e.g. `"0.000042000000000000"`.
    pub fn formatted_fee(&self) -> String {
        format_units(self.fee, self.blockchain.native_decimals())
            .unwrap_or_else(|_| self.fee.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// Charged by the attestation service for fast transfers.
    Provider,
}

impl FeeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
        }
    }
}

/// A protocol fee, deducted from the transferred amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(rename = "type")]
    pub fee_type: FeeType,
    /// Decimal amount in `token` units.
    pub amount: String,
    pub token: String,
}

/// Quote for a transfer. Replaced wholesale by every estimate call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub gas_fees: Vec<GasFee>,
    pub fees: Vec<Fee>,
}

impl Estimate {
    pub fn gas_fee(&self, name: StepName) -> Option<&GasFee> {
        self.gas_fees.iter().find(|fee| fee.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Success,
    Noop,
    /// The step could not be submitted.
    Error,
    /// The step was mined but reverted.
    Failed,
}

impl StepState {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Failed)
    }
}

/// Engine-reported result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub name: StepName,
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn success(name: StepName, tx_hash: Option<String>, explorer_url: Option<String>) -> Self {
        Self {
            name,
            state: StepState::Success,
            tx_hash,
            explorer_url,
            error: None,
        }
    }

    /// The step never made it on chain.
    pub fn error(name: StepName, error: impl Into<String>) -> Self {
        Self {
            name,
            state: StepState::Error,
            tx_hash: None,
            explorer_url: None,
            error: Some(error.into()),
        }
    }

    /// The step was mined and reverted.
    pub fn failed(name: StepName, tx_hash: String, explorer_url: String) -> Self {
        Self {
            name,
            state: StepState::Failed,
            tx_hash: Some(tx_hash),
            explorer_url: Some(explorer_url),
            error: Some("Transaction reverted".to_string()),
        }
    }
}

/// Outcome of a `bridge` call that returned rather than failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResult {
    pub source: Chain,
    pub destination: Chain,
    pub amount: String,
    pub recipient: Option<Address>,
    pub speed: TransferSpeed,
    pub steps: Vec<StepResult>,
}

impl BridgeResult {
    /// First step in `error` or `failed` state, if any.
    pub fn failed_step(&self) -> Option<&StepResult> {
        self.steps.iter().find(|step| step.state.is_failure())
    }

    pub fn first_tx_hash(&self) -> Option<&str> {
        self.steps.first().and_then(|step| step.tx_hash.as_deref())
    }
}
