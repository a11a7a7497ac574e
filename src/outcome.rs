// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Outcome classification
//!
//! Turns whatever a bridge call produced, a result with per-step states or an
//! error message, into one of four user-facing outcomes. Classification never
//! fails.

use serde::Serialize;
use tracing::info;

use crate::chain::{explorer_tx_url, Chain};
use crate::engine::BridgeResult;
use crate::error::BridgeError;
use crate::notification::{Notification, NotificationKind};
use crate::progress::TerminalSignal;

pub const USER_REJECTED_MESSAGE: &str = "You rejected the transaction in your wallet.";
pub const MISSING_TX_HASH_MESSAGE: &str = "User rejected transaction or initialization failed.";
pub const MINT_RETRY_MESSAGE: &str = "Destination chain mint failed. Add native gas and retry.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Transaction failed.";

const REJECTION_MARKERS: [&str; 3] = ["user rejected", "user denied", "rejected transaction"];
const MINT_FAILURE_MARKER: &str = "mint step failed";

/// True when `message` reads like a wallet refusing to sign.
pub fn is_rejection_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    REJECTION_MARKERS.iter().any(|marker| lower.contains(marker))
}

pub fn is_mint_failure_message(message: &str) -> bool {
    message.to_lowercase().contains(MINT_FAILURE_MARKER)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success { tx_hash: String },
    Cancelled { message: String },
    /// The burn settled but the mint did not; retrying after funding
    /// destination gas can complete the transfer.
    RecoverableError { message: String },
    FatalError { message: String },
}

impl Outcome {
    /// Classifies a result the engine returned.
    ///
    /// A failed step wins over everything else; otherwise success requires a
    /// transaction hash on the first step.
    pub fn classify_result(result: &BridgeResult) -> Self {
        if let Some(step) = result.failed_step() {
            let message = step
                .error
                .as_deref()
                .filter(|message| !message.is_empty())
                .unwrap_or(GENERIC_FAILURE_MESSAGE);
            return Self::FatalError {
                message: message.to_string(),
            };
        }

        match result.first_tx_hash() {
            Some(tx_hash) if !tx_hash.is_empty() => Self::Success {
                tx_hash: tx_hash.to_string(),
            },
            _ => Self::Cancelled {
                message: MISSING_TX_HASH_MESSAGE.to_string(),
            },
        }
    }

    /// Classifies the message of an error the engine raised.
    pub fn classify_error(message: &str) -> Self {
        if is_rejection_message(message) {
            Self::Cancelled {
                message: USER_REJECTED_MESSAGE.to_string(),
            }
        } else if is_mint_failure_message(message) {
            Self::RecoverableError {
                message: MINT_RETRY_MESSAGE.to_string(),
            }
        } else {
            Self::FatalError {
                message: message.to_string(),
            }
        }
    }

    pub fn classify(result: &Result<BridgeResult, BridgeError>) -> Self {
        let outcome = match result {
            Ok(result) => Self::classify_result(result),
            Err(error) => Self::classify_error(&error.to_string()),
        };
        info!(outcome = outcome.kind(), event = "bridge_outcome_classified");
        outcome
    }

    /// Inline message for a failed estimate. Only the mint rewrite applies;
    /// anything else is shown verbatim.
    pub fn classify_estimate_error(message: &str) -> String {
        if is_mint_failure_message(message) {
            MINT_RETRY_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Cancelled { .. } => "cancelled",
            Self::RecoverableError { .. } => "recoverable_error",
            Self::FatalError { .. } => "fatal_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Message for display; `None` on success.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Cancelled { message }
            | Self::RecoverableError { message }
            | Self::FatalError { message } => Some(message),
        }
    }

    /// Inline banner text. Cancellation only produces a toast.
    pub fn inline_error(&self) -> Option<&str> {
        match self {
            Self::RecoverableError { message } | Self::FatalError { message } => Some(message),
            Self::Success { .. } | Self::Cancelled { .. } => None,
        }
    }

    pub fn terminal_signal(&self) -> TerminalSignal {
        if self.is_success() {
            TerminalSignal::Success
        } else {
            TerminalSignal::Failure
        }
    }

    /// The one notification this outcome produces.
    ///
    /// Recoverable and fatal errors share the same presentation.
    pub fn notification(&self, source: Chain) -> Notification {
        match self {
            Self::Success { tx_hash } => {
                let short: String = tx_hash.chars().take(10).collect();
                Notification::new(
                    NotificationKind::Success,
                    "Bridge Successful",
                    format!(
                        "Transaction Hash: {short}... ({})",
                        explorer_tx_url(source.identifier(), tx_hash)
                    ),
                )
            }
            Self::Cancelled { message } => {
                Notification::new(NotificationKind::Warning, "Transaction Cancelled", message)
            }
            Self::RecoverableError { message } | Self::FatalError { message } => {
                Notification::new(NotificationKind::Error, "Bridge Failed", message)
            }
        }
    }
}
