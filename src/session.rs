// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Interactive bridge session
//!
//! [`SessionState`] is everything the view renders: selected chains, inputs,
//! in-flight flags, the latest estimate, the inline error, the transfer
//! timeline and the current notification. [`BridgeSession`] owns one state
//! and the wallet connection and implements the estimate and bridge actions
//! on top of them.

use alloy_primitives::Address;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::chain::{default_route, supported_chains, Chain, ChainInfo};
use crate::clock::Clock;
use crate::config::WalletConnectivity;
use crate::engine::{Estimate, TransferRequest, TransferSpeed};
use crate::error::{BridgeError, Result};
use crate::notification::{Notification, NotificationCenter};
use crate::outcome::Outcome;
use crate::progress::{drive, ProgressTracker, TransferTimeline, TICK_PERIOD};
use crate::wallet::{resolve_provider, SharedEngine, WalletConnection};

/// UI state, owned by one [`BridgeSession`].
pub struct SessionState<C: Clock> {
    pub chains: Vec<ChainInfo>,
    pub from: Option<Chain>,
    pub to: Option<Chain>,
    pub amount: String,
    /// Raw recipient input; empty means the connected account.
    pub recipient: String,
    pub speed: TransferSpeed,
    pub estimating: bool,
    pub bridging: bool,
    pub estimate: Option<Estimate>,
    /// Inline error banner.
    pub error: Option<String>,
    pub provider: Option<SharedEngine>,
    pub progress: ProgressTracker<C>,
    pub notifications: NotificationCenter,
}

impl<C: Clock> SessionState<C> {
    pub fn new(clock: C) -> Self {
        Self {
            chains: Vec::new(),
            from: None,
            to: None,
            amount: String::new(),
            recipient: String::new(),
            speed: TransferSpeed::Fast,
            estimating: false,
            bridging: false,
            estimate: None,
            error: None,
            provider: None,
            progress: ProgressTracker::new(clock),
            notifications: NotificationCenter::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.progress.clock().now()
    }

    pub fn timeline(&self) -> Option<&TransferTimeline> {
        self.progress.timeline()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current(self.now())
    }

    pub fn is_busy(&self) -> bool {
        self.estimating || self.bridging
    }

    /// True when the bridge action may be offered.
    pub fn can_bridge(&self) -> bool {
        self.provider.is_some()
            && !self.amount.trim().is_empty()
            && matches!((self.from, self.to), (Some(from), Some(to)) if from != to)
    }

    /// Builds the engine request, or the message the UI shows instead.
    pub fn request(&self) -> Result<(SharedEngine, TransferRequest)> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| BridgeError::validation("Wallet not connected"))?;
        let (Some(from), Some(to)) = (self.from, self.to) else {
            return Err(BridgeError::validation(
                "Select both source and destination chains",
            ));
        };
        let recipient = match self.recipient.trim() {
            "" => None,
            raw => Some(
                raw.parse::<Address>()
                    .map_err(|_| BridgeError::validation(format!("Invalid recipient: {raw}")))?,
            ),
        };

        let request = TransferRequest::builder()
            .from(from)
            .to(to)
            .amount(self.amount.trim())
            .maybe_recipient(recipient)
            .speed(self.speed)
            .build();
        Ok((provider, request))
    }
}

/// Drives the estimate and bridge actions against a wallet connection.
///
/// At most one action runs at a time: a call made while another is
/// outstanding returns immediately without touching the state.
pub struct BridgeSession<W, C: Clock> {
    wallet: W,
    state: SessionState<C>,
}

impl<W: WalletConnection, C: Clock> BridgeSession<W, C> {
    pub fn new(wallet: W, clock: C) -> Self {
        Self {
            wallet,
            state: SessionState::new(clock),
        }
    }

    /// Opens a session only when wallet connectivity is configured.
    ///
    /// `None` means the front end shows the informational page instead.
    pub fn open(connectivity: &WalletConnectivity, wallet: W, clock: C) -> Option<Self> {
        if !connectivity.is_enabled() {
            info!(event = "wallet_connectivity_disabled");
            return None;
        }
        let mut session = Self::new(wallet, clock);
        session.load_chains();
        Some(session)
    }

    pub fn state(&self) -> &SessionState<C> {
        &self.state
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Loads the chain registry and selects the default route.
    pub fn load_chains(&mut self) {
        let chains = supported_chains();
        let (from, to) = default_route(&chains);
        self.state.chains = chains;
        self.state.from = from;
        self.state.to = to;
    }

    /// Re-resolves the signing provider from the wallet connection.
    pub async fn refresh_provider(&mut self) -> bool {
        self.state.provider = resolve_provider(&self.wallet).await;
        self.state.provider.is_some()
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.state.amount = amount.into();
        self.invalidate_estimate();
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.state.recipient = recipient.into();
        self.invalidate_estimate();
    }

    pub fn set_from(&mut self, chain: Chain) {
        self.state.from = Some(chain);
        self.invalidate_estimate();
    }

    pub fn set_to(&mut self, chain: Chain) {
        self.state.to = Some(chain);
        self.invalidate_estimate();
    }

    pub fn switch_chains(&mut self) {
        std::mem::swap(&mut self.state.from, &mut self.state.to);
        self.invalidate_estimate();
    }

    pub fn can_bridge(&self) -> bool {
        self.state.can_bridge()
    }

    /// Drops the notification once its time is up.
    pub fn expire_notifications(&mut self) -> bool {
        let now = self.state.now();
        self.state.notifications.expire(now)
    }

    fn invalidate_estimate(&mut self) {
        if self.state.estimate.take().is_some() {
            debug!(event = "estimate_invalidated");
        }
    }

    /// Requests a quote for the current inputs.
    ///
    /// Failures land in the inline error; the returned estimate is `None`
    /// then, or when another action is outstanding.
    pub async fn estimate(&mut self) -> Option<&Estimate> {
        if self.state.is_busy() {
            warn!(event = "estimate_refused_busy");
            return None;
        }

        self.state.error = None;
        self.state.estimating = true;
        self.state.estimate = None;
        self.state.progress.clear();

        let result = match self.state.request() {
            Ok((engine, request)) => {
                switch_chain_best_effort(&self.wallet, request.from).await;
                engine.estimate(&request).await
            }
            Err(e) => Err(e),
        };

        self.state.estimating = false;
        match result {
            Ok(estimate) => {
                info!(event = "estimate_ready");
                self.state.estimate = Some(estimate);
                self.state.estimate.as_ref()
            }
            Err(e) => {
                let message = Outcome::classify_estimate_error(&e.to_string());
                warn!(error = %message, event = "estimate_failed");
                self.state.error = Some(message);
                None
            }
        }
    }

    /// Runs a bridge with simulated progress and applies the outcome.
    ///
    /// `on_tick` sees the timeline on every timer tick while the call is in
    /// flight. Returns `None` when another action is outstanding.
    pub async fn bridge(&mut self, on_tick: impl FnMut(&TransferTimeline)) -> Option<Outcome> {
        if self.state.is_busy() {
            warn!(event = "bridge_refused_busy");
            return None;
        }

        self.state.error = None;
        self.state.bridging = true;
        self.state.progress.start();

        let source = self.state.from;
        let prepared = self.state.request();
        let wallet = &self.wallet;
        let work = async move {
            let (engine, request) = prepared?;
            switch_chain_best_effort(wallet, request.from).await;
            engine.bridge(&request).await
        };
        let result = drive(&mut self.state.progress, TICK_PERIOD, work, on_tick).await;

        let outcome = Outcome::classify(&result);
        self.apply_outcome(&outcome, source);
        self.state.progress.stop();
        self.state.bridging = false;
        Some(outcome)
    }

    fn apply_outcome(&mut self, outcome: &Outcome, source: Option<Chain>) {
        self.state.progress.force_terminal(outcome.terminal_signal());
        if let Some(message) = outcome.inline_error() {
            self.state.error = Some(message.to_string());
        }
        let notification = outcome.notification(source.unwrap_or(Chain::EthereumSepolia));
        let now = self.state.now();
        self.state.notifications.show(notification, now);
    }
}

/// The following engine call fails clearly on the wrong network, so a failed
/// switch is only logged.
async fn switch_chain_best_effort<W: WalletConnection + ?Sized>(wallet: &W, chain: Chain) {
    if let Err(e) = wallet.switch_chain(chain.chain_id()).await {
        debug!(chain = %chain, error = %e, event = "switch_chain_ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::engine::{StepResult, StepState};
    use crate::notification::NotificationKind;
    use crate::outcome::{MINT_RETRY_MESSAGE, USER_REJECTED_MESSAGE};
    use crate::progress::{StepName, StepStatus};
    use crate::testing::{BridgeScript, FakeEngine, FakeWallet};
    use std::sync::Arc;
    use std::time::Duration;

    async fn session_with(engine: Arc<FakeEngine>) -> BridgeSession<FakeWallet, TokioClock> {
        let mut session = BridgeSession::new(FakeWallet::connected(engine), TokioClock::new());
        session.load_chains();
        session.refresh_provider().await;
        session.set_amount("1.00");
        session
    }

    #[tokio::test]
    async fn test_default_route_and_can_bridge() {
        let mut session = session_with(Arc::new(FakeEngine::new())).await;
        assert_eq!(session.state().from, Some(Chain::EthereumSepolia));
        assert_eq!(session.state().to, Some(Chain::ArcTestnet));
        assert!(session.can_bridge());

        session.set_to(Chain::EthereumSepolia);
        assert!(!session.can_bridge());
        session.set_to(Chain::ArcTestnet);
        session.set_amount("  ");
        assert!(!session.can_bridge());
    }

    #[test]
    fn test_open_requires_wallet_connectivity() {
        let disabled = WalletConnectivity::from_project_id(Some("  ".to_string()));
        assert!(BridgeSession::open(&disabled, FakeWallet::new(), TokioClock::new()).is_none());

        let enabled = WalletConnectivity::from_project_id(Some("abc123".to_string()));
        let session = BridgeSession::open(&enabled, FakeWallet::new(), TokioClock::new())
            .expect("connectivity is enabled");
        assert_eq!(session.state().from, Some(Chain::EthereumSepolia));
        assert_eq!(session.state().chains.len(), 2);
    }

    #[tokio::test]
    async fn test_can_bridge_requires_provider() {
        let mut session = BridgeSession::new(FakeWallet::new(), TokioClock::new());
        session.load_chains();
        session.set_amount("1");
        assert!(!session.refresh_provider().await);
        assert!(!session.can_bridge());
    }

    #[tokio::test]
    async fn test_estimate_success_and_invalidation() {
        let engine = Arc::new(FakeEngine::new());
        let mut session = session_with(engine.clone()).await;

        assert!(session.estimate().await.is_some());
        assert!(!session.state().estimating);
        assert_eq!(engine.estimate_calls(), 1);
        assert_eq!(session.wallet().switched_to(), vec![11_155_111]);

        session.switch_chains();
        assert!(session.state().estimate.is_none());
        assert_eq!(session.state().from, Some(Chain::ArcTestnet));
    }

    #[tokio::test]
    async fn test_estimate_error_rewrites_mint_failure_only() {
        let engine = Arc::new(FakeEngine::new().with_estimate_error("Mint step failed: no gas"));
        let mut session = session_with(engine).await;
        assert!(session.estimate().await.is_none());
        assert_eq!(session.state().error.as_deref(), Some(MINT_RETRY_MESSAGE));

        let engine = Arc::new(FakeEngine::new().with_estimate_error("execution reverted"));
        let mut session = session_with(engine).await;
        session.estimate().await;
        assert_eq!(session.state().error.as_deref(), Some("execution reverted"));
    }

    #[tokio::test]
    async fn test_estimate_without_wallet_is_inline_error() {
        let mut session = BridgeSession::new(FakeWallet::new(), TokioClock::new());
        session.load_chains();
        assert!(session.estimate().await.is_none());
        assert_eq!(session.state().error.as_deref(), Some("Wallet not connected"));
    }

    #[tokio::test]
    async fn test_switch_failure_is_ignored() {
        let engine = Arc::new(FakeEngine::new());
        let mut session = BridgeSession::new(
            FakeWallet::connected(engine.clone()).with_failing_switch(),
            TokioClock::new(),
        );
        session.load_chains();
        session.refresh_provider().await;
        session.set_amount("1");

        let outcome = session.bridge(|_| {}).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(engine.bridge_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bridge_success_completes_timeline() {
        let engine = Arc::new(FakeEngine::new().with_latency(Duration::from_secs(3)));
        let mut session = session_with(engine).await;

        let outcome = session.bridge(|_| {}).await.unwrap();
        assert!(outcome.is_success());

        let timeline = session.state().timeline().unwrap();
        assert!(timeline
            .steps()
            .iter()
            .all(|step| step.status == StepStatus::Completed));
        assert!(!session.state().bridging);
        assert!(session.state().error.is_none());
        let toast = session.state().notification().unwrap();
        assert_eq!(toast.kind, NotificationKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_marks_active_step_and_warns() {
        let engine = Arc::new(
            FakeEngine::new()
                .with_latency(Duration::from_millis(1_500))
                .failing_with("User rejected the request."),
        );
        let mut session = session_with(engine).await;

        let outcome = session.bridge(|_| {}).await.unwrap();
        assert_eq!(outcome.message(), Some(USER_REJECTED_MESSAGE));

        let timeline = session.state().timeline().unwrap();
        assert_eq!(timeline.status_of(StepName::Approve), StepStatus::Error);
        // cancellation produces a toast but no inline banner
        assert!(session.state().error.is_none());
        assert_eq!(
            session.state().notification().map(|n| n.kind),
            Some(NotificationKind::Warning)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_step_result_is_fatal() {
        let engine = Arc::new(
            FakeEngine::new()
                .with_latency(Duration::from_secs(13))
                .with_bridge(BridgeScript::Steps(vec![
                    StepResult::success(StepName::Approve, Some("0x01".to_string()), None),
                    StepResult {
                        state: StepState::Failed,
                        ..StepResult::error(StepName::Burn, "execution reverted")
                    },
                ])),
        );
        let mut session = session_with(engine).await;

        let outcome = session.bridge(|_| {}).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::FatalError {
                message: "execution reverted".to_string()
            }
        );
        // the simulated clock had reached Attestation when the result arrived
        let timeline = session.state().timeline().unwrap();
        assert_eq!(timeline.status_of(StepName::Attestation), StepStatus::Error);
        assert_eq!(session.state().error.as_deref(), Some("execution reverted"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failure_flips_first_step() {
        let mut session = BridgeSession::new(FakeWallet::new(), TokioClock::new());
        session.load_chains();

        let outcome = session.bridge(|_| {}).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::FatalError {
                message: "Wallet not connected".to_string()
            }
        );
        let timeline = session.state().timeline().unwrap();
        assert_eq!(timeline.status_of(StepName::Approve), StepStatus::Error);
        assert_eq!(
            session.state().notification().map(|n| n.title.as_str()),
            Some("Bridge Failed")
        );
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_validation_error() {
        let mut session = session_with(Arc::new(FakeEngine::new())).await;
        session.set_recipient("not-an-address");
        session.estimate().await;
        assert_eq!(
            session.state().error.as_deref(),
            Some("Invalid recipient: not-an-address")
        );
    }

    #[tokio::test]
    async fn test_request_carries_recipient() {
        let engine = Arc::new(FakeEngine::new());
        let mut session = session_with(engine.clone()).await;
        session.set_recipient("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
        session.estimate().await;

        let request = engine.last_request().unwrap();
        assert!(request.recipient.is_some());
        assert_eq!(request.speed, TransferSpeed::Fast);
        assert_eq!(request.amount, "1.00");
    }
}
