// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Span helpers for bridge operations
//!
//! Static span names with structured attributes, kept apart from the engine
//! logic. Exposed publicly for callers that want to nest their own
//! instrumentation under the same names.
//!
//! # Example
//!
//! ```rust,no_run
//! use arc_bridge::{spans, Chain};
//!
//! let span = spans::estimate(Chain::EthereumSepolia, Chain::ArcTestnet, "1.00");
//! let _guard = span.enter();
//! ```

use alloy_primitives::TxHash;
use tracing::Span;

use crate::chain::Chain;
use crate::progress::StepName;

/// Parent: caller
/// Children: RPC gas estimates, fee lookup
#[inline]
pub fn estimate(source: Chain, destination: Chain, amount: &str) -> Span {
    tracing::info_span!(
        "arc_bridge.estimate",
        source_chain = %source,
        destination_chain = %destination,
        amount = amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Parent: caller
/// Children: arc_bridge.send_step, arc_bridge.poll_attestation
#[inline]
pub fn bridge(source: Chain, destination: Chain, amount: &str, speed: &str) -> Span {
    tracing::info_span!(
        "arc_bridge.bridge",
        source_chain = %source,
        destination_chain = %destination,
        amount = amount,
        speed = speed,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// One transaction of the bridge sequence, from submission to receipt.
///
/// Parent: arc_bridge.bridge
#[inline]
pub fn send_step(step: StepName, chain: Chain) -> Span {
    tracing::info_span!(
        "arc_bridge.send_step",
        step = %step,
        chain = %chain,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Parent: arc_bridge.bridge
/// Children: arc_bridge.attestation_attempt
#[inline]
pub fn poll_attestation(
    tx_hash: TxHash,
    source_domain: u32,
    max_attempts: u32,
    poll_interval_secs: u64,
) -> Span {
    tracing::info_span!(
        "arc_bridge.poll_attestation",
        tx_hash = %tx_hash,
        source_domain = source_domain,
        max_attempts = max_attempts,
        poll_interval_secs = poll_interval_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

#[inline]
pub fn attestation_attempt(attempt: u32) -> Span {
    tracing::debug_span!("arc_bridge.attestation_attempt", attempt = attempt)
}

/// Records error attributes on the current span.
///
/// ```rust,no_run
/// use arc_bridge::{spans, BridgeError};
///
/// let span = tracing::info_span!("arc_bridge.operation");
/// let _guard = span.enter();
/// spans::record_error(&BridgeError::AttestationTimeout);
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");
}

/// Records an error with extra context on the current span.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
