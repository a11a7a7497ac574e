// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Test utilities and fake implementations
//!
//! Fakes for the clock, the attestation service, the transfer engine and the
//! wallet connection, so polling, session, progress and outcome logic can be
//! exercised without a chain or a wallet.

use alloy_primitives::TxHash;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::engine::{
    AttestationProvider, AttestationStatus, AttestedMessage, BridgeResult, BurnFee, Estimate,
    StepResult, TransferEngine, TransferRequest, V2Message, V2MessagesResponse,
};
use crate::error::{BridgeError, Result};
use crate::progress::StepName;
use crate::wallet::{SharedEngine, WalletConnection};

// ============================================================================
// Fake Clock
// ============================================================================

/// A clock that only moves when told to.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted answer of [`FakeAttestationProvider`].
#[derive(Debug, Clone)]
pub enum IrisReply {
    /// HTTP 429 with this `Retry-After`.
    RateLimited { retry_after_seconds: u64 },
    /// HTTP 404.
    NotFound,
    /// A body that does not decode.
    Malformed,
    /// A 200 with an empty message list.
    NoMessages,
    Pending,
    Failed,
    /// Complete but without message or attestation bytes.
    CompleteWithoutData,
    Complete(AttestedMessage),
}

impl IrisReply {
    fn into_response(self) -> Result<V2MessagesResponse> {
        let message = |status, attested: Option<AttestedMessage>| V2MessagesResponse {
            messages: vec![V2Message {
                status,
                message: attested.as_ref().map(|a| a.message.clone()),
                attestation: attested.map(|a| a.attestation),
            }],
        };
        match self {
            Self::RateLimited {
                retry_after_seconds,
            } => Err(BridgeError::RateLimitExceeded {
                retry_after_seconds,
            }),
            Self::NotFound => Err(BridgeError::AttestationNotFound),
            Self::Malformed => serde_json::from_str("{\"messages\":").map_err(BridgeError::from),
            Self::NoMessages => Ok(V2MessagesResponse { messages: vec![] }),
            Self::Pending => Ok(message(AttestationStatus::Pending, None)),
            Self::Failed => Ok(message(AttestationStatus::Failed, None)),
            Self::CompleteWithoutData => Ok(message(AttestationStatus::Complete, None)),
            Self::Complete(attested) => Ok(message(AttestationStatus::Complete, Some(attested))),
        }
    }
}

/// An attestation service that replays scripted answers in order.
///
/// Once the script runs out the last answer repeats. With no script every
/// request answers 404.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    replies: Arc<Mutex<Vec<IrisReply>>>,
    calls: Arc<AtomicUsize>,
    burn_fees: Arc<Mutex<Vec<BurnFee>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response_sequence(&self, replies: Vec<IrisReply>) {
        *self.replies.lock().unwrap() = replies;
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn add_complete_response(&self, attested: AttestedMessage) {
        self.add_response_sequence(vec![IrisReply::Complete(attested)]);
    }

    pub fn add_always_pending(&self) {
        self.add_response_sequence(vec![IrisReply::Pending]);
    }

    pub fn with_burn_fees(self, fees: Vec<BurnFee>) -> Self {
        *self.burn_fees.lock().unwrap() = fees;
        self
    }

    /// Number of `get_messages` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(&self, _source_domain: u32, _tx_hash: TxHash) -> Result<V2MessagesResponse> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let replies = self.replies.lock().unwrap();
        let reply = replies
            .get(index)
            .or_else(|| replies.last())
            .cloned()
            .unwrap_or(IrisReply::NotFound);
        reply.into_response()
    }

    async fn get_burn_fees(
        &self,
        _source_domain: u32,
        _destination_domain: u32,
    ) -> Result<Vec<BurnFee>> {
        Ok(self.burn_fees.lock().unwrap().clone())
    }
}

// ============================================================================
// Fake Engine
// ============================================================================

/// What the fake engine does when `bridge` is called.
#[derive(Debug, Clone)]
pub enum BridgeScript {
    /// Every step succeeds; approve carries `tx_hash`.
    Succeed { tx_hash: String },
    /// Returns these step results as-is.
    Steps(Vec<StepResult>),
    /// Fails with this message.
    Fail(String),
}

/// A transfer engine with scripted responses.
///
/// Latency is spent with `tokio::time::sleep`, so paused-time tests can
/// observe a call while it is in flight.
#[derive(Debug)]
pub struct FakeEngine {
    estimate: Mutex<std::result::Result<Estimate, String>>,
    bridge: Mutex<BridgeScript>,
    latency: Duration,
    estimate_calls: AtomicUsize,
    bridge_calls: AtomicUsize,
    last_request: Mutex<Option<TransferRequest>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            estimate: Mutex::new(Ok(Estimate::default())),
            bridge: Mutex::new(BridgeScript::Succeed {
                tx_hash: format!("0x{}", "ab".repeat(32)),
            }),
            latency: Duration::ZERO,
            estimate_calls: AtomicUsize::new(0),
            bridge_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_estimate(self, estimate: Estimate) -> Self {
        *self.estimate.lock().unwrap() = Ok(estimate);
        self
    }

    pub fn with_estimate_error(self, message: impl Into<String>) -> Self {
        *self.estimate.lock().unwrap() = Err(message.into());
        self
    }

    pub fn with_bridge(self, script: BridgeScript) -> Self {
        *self.bridge.lock().unwrap() = script;
        self
    }

    pub fn failing_with(self, message: impl Into<String>) -> Self {
        self.with_bridge(BridgeScript::Fail(message.into()))
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn bridge_calls(&self) -> usize {
        self.bridge_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<TransferRequest> {
        self.last_request.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl TransferEngine for FakeEngine {
    async fn estimate(&self, request: &TransferRequest) -> Result<Estimate> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.wait().await;
        self.estimate.lock().unwrap().clone().map_err(BridgeError::Engine)
    }

    async fn bridge(&self, request: &TransferRequest) -> Result<BridgeResult> {
        self.bridge_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.wait().await;

        let script = self.bridge.lock().unwrap().clone();
        let steps = match script {
            BridgeScript::Succeed { tx_hash } => StepName::ALL
                .into_iter()
                .map(|name| {
                    let hash = (name == StepName::Approve).then(|| tx_hash.clone());
                    StepResult::success(name, hash, None)
                })
                .collect(),
            BridgeScript::Steps(steps) => steps,
            BridgeScript::Fail(message) => return Err(BridgeError::Engine(message)),
        };

        Ok(BridgeResult {
            source: request.from,
            destination: request.to,
            amount: request.amount.clone(),
            recipient: request.recipient,
            speed: request.speed,
            steps,
        })
    }
}

// ============================================================================
// Fake Wallet
// ============================================================================

/// A wallet connection with configurable provider slots and failures.
#[derive(Default)]
pub struct FakeWallet {
    client: Option<SharedEngine>,
    connector: Option<SharedEngine>,
    connector_fails: bool,
    switch_fails: bool,
    connector_calls: AtomicUsize,
    switched_to: Mutex<Vec<u64>>,
}

impl FakeWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet whose client exposes `engine` directly.
    pub fn connected(engine: SharedEngine) -> Self {
        Self::new().with_client(engine)
    }

    pub fn with_client(mut self, engine: SharedEngine) -> Self {
        self.client = Some(engine);
        self
    }

    pub fn with_connector(mut self, engine: SharedEngine) -> Self {
        self.connector = Some(engine);
        self
    }

    pub fn with_failing_connector(mut self) -> Self {
        self.connector_fails = true;
        self
    }

    pub fn with_failing_switch(mut self) -> Self {
        self.switch_fails = true;
        self
    }

    pub fn connector_calls(&self) -> usize {
        self.connector_calls.load(Ordering::SeqCst)
    }

    /// Chain ids passed to `switch_chain`, in call order.
    pub fn switched_to(&self) -> Vec<u64> {
        self.switched_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletConnection for FakeWallet {
    fn client_provider(&self) -> Option<SharedEngine> {
        self.client.clone()
    }

    async fn connector_provider(&self) -> Result<Option<SharedEngine>> {
        self.connector_calls.fetch_add(1, Ordering::SeqCst);
        if self.connector_fails {
            return Err(BridgeError::Provider("connector unavailable".to_string()));
        }
        Ok(self.connector.clone())
    }

    async fn switch_chain(&self, chain_id: alloy_chains::Chain) -> Result<()> {
        self.switched_to.lock().unwrap().push(chain_id.id());
        if self.switch_fails {
            return Err(BridgeError::Provider("switch chain not supported".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use crate::engine::StepState;

    fn request() -> TransferRequest {
        TransferRequest::builder()
            .from(Chain::EthereumSepolia)
            .to(Chain::ArcTestnet)
            .amount("2.5")
            .build()
    }

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(120)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(180));
        assert_eq!(clock.now() - start, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_fake_engine_default_succeeds() {
        let engine = FakeEngine::new();
        let result = engine.bridge(&request()).await.unwrap();

        assert_eq!(result.steps.len(), 4);
        assert!(result.steps.iter().all(|s| s.state == StepState::Success));
        assert!(result.first_tx_hash().is_some());
        assert_eq!(engine.bridge_calls(), 1);
        assert_eq!(engine.last_request(), Some(request()));
    }

    #[tokio::test]
    async fn test_fake_engine_failure_message_is_verbatim() {
        let engine = FakeEngine::new()
            .failing_with("Mint step failed: insufficient gas")
            .with_estimate_error("rpc down");
        let err = engine.bridge(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Mint step failed: insufficient gas");
        let err = engine.estimate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "rpc down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fake_engine_latency_uses_tokio_time() {
        let engine = FakeEngine::new().with_latency(Duration::from_secs(5));
        let start = tokio::time::Instant::now();
        engine.estimate(&request()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_fake_wallet_records_switches() {
        let wallet = FakeWallet::new().with_failing_switch();
        let result = wallet
            .switch_chain(Chain::ArcTestnet.chain_id())
            .await;
        assert!(result.is_err());
        assert_eq!(wallet.switched_to(), vec![5_042_002]);
    }
}
