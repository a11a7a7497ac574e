// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Transfer engine boundary
//!
//! [`TransferEngine`] is the call surface the session and the CLI consume:
//! `estimate` and `bridge`, both asynchronous and both failing with an opaque
//! [`BridgeError`] whose message is the only part callers inspect.
//! [`CctpEngine`] is the reference implementation on top of CCTP v2.

mod cctp;
mod contracts;
mod iris;
mod types;

pub use cctp::{CctpEngine, APPROVE_GAS_FALLBACK, BURN_GAS_FALLBACK, MINT_GAS_LIMIT};
pub use iris::{
    AttestationProvider, AttestationStatus, AttestedMessage, BurnFee, IrisApi, IrisClient,
    V2Message, V2MessagesResponse, DEFAULT_RETRY_AFTER_SECS,
};
pub use types::{BridgeResult, Estimate, Fee, FeeType, GasFee, StepResult, StepState};

use alloy_primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256,
};
use async_trait::async_trait;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chain::{Chain, USDC_DECIMALS};
use crate::error::{BridgeError, Result};

/// Attestation speed requested for a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferSpeed {
    /// Attested at "confirmed" finality for a provider fee.
    #[default]
    Fast,
    /// Attested at "finalized" finality, no provider fee.
    Slow,
}

impl TransferSpeed {
    /// CCTP v2 `minFinalityThreshold` for this speed.
    pub const fn finality_threshold(self) -> u32 {
        match self {
            Self::Fast => 1000,
            Self::Slow => 2000,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "FAST",
            Self::Slow => "SLOW",
        }
    }
}

impl fmt::Display for TransferSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferSpeed {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAST" => Ok(Self::Fast),
            "SLOW" => Ok(Self::Slow),
            other => Err(BridgeError::validation(format!(
                "Unknown transfer speed: {other} (expected FAST or SLOW)"
            ))),
        }
    }
}

/// Parameters shared by `estimate` and `bridge`.
///
/// ```rust
/// use arc_bridge::{Chain, TransferRequest, TransferSpeed};
///
/// let request = TransferRequest::builder()
///     .from(Chain::EthereumSepolia)
///     .to(Chain::ArcTestnet)
///     .amount("1.00")
///     .build();
/// assert_eq!(request.speed, TransferSpeed::Fast);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct TransferRequest {
    pub from: Chain,
    pub to: Chain,
    /// Human-readable USDC amount, e.g. `"1.50"`.
    #[builder(into)]
    pub amount: String,
    /// Defaults to the signing account.
    pub recipient: Option<Address>,
    #[builder(default)]
    pub speed: TransferSpeed,
}

impl TransferRequest {
    /// Checks the route and returns the amount in USDC base units.
    pub fn validate(&self) -> Result<U256> {
        if self.from == self.to {
            return Err(BridgeError::validation(
                "Source and destination chains must differ",
            ));
        }
        parse_usdc(&self.amount)
    }
}

/// Parses a decimal USDC amount into base units (6 decimals).
pub fn parse_usdc(amount: &str) -> Result<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::validation("Amount is required"));
    }

    let parsed = parse_units(trimmed, USDC_DECIMALS)
        .map_err(|_| BridgeError::InvalidAmount(amount.to_string()))?;
    let value = match parsed {
        ParseUnits::U256(value) => value,
        ParseUnits::I256(_) => return Err(BridgeError::InvalidAmount(amount.to_string())),
    };
    if value.is_zero() {
        return Err(BridgeError::InvalidAmount(amount.to_string()));
    }
    Ok(value)
}

/// The external transfer engine.
///
/// Both calls may fail with an opaque error; callers classify it by message.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    async fn estimate(&self, request: &TransferRequest) -> Result<Estimate>;

    async fn bridge(&self, request: &TransferRequest) -> Result<BridgeResult>;
}
