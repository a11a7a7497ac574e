// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! # arc-bridge
//!
//! USDC bridging between Ethereum Sepolia and Arc Testnet over Circle's
//! Cross-Chain Transfer Protocol (CCTP) v2.
//!
//! The crate has two halves:
//!
//! - A reference transfer engine, [`CctpEngine`], that estimates and executes
//!   approve → burn → attestation → mint against real RPC endpoints and the
//!   Iris attestation service.
//! - The interactive core around any [`TransferEngine`]: a simulated
//!   [`ProgressTracker`] for the four transfer steps, an [`Outcome`]
//!   classifier that turns whatever the engine produced into one of four
//!   user-facing outcomes, toast [`Notification`]s and the explicit
//!   [`SessionState`] a view renders.
//!
//! ## Estimating a transfer
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use alloy_provider::ProviderBuilder;
//! use arc_bridge::{
//!     AppConfig, BridgeError, CctpEngine, Chain, IrisClient, TokioClock, TransferEngine,
//!     TransferRequest, TransferSpeed,
//! };
//!
//! # async fn example() -> Result<(), BridgeError> {
//! let config = AppConfig::from_env()?;
//! let sepolia = ProviderBuilder::new().connect_http(config.ethereum_sepolia_rpc.clone());
//! let arc = ProviderBuilder::new().connect_http(config.arc_testnet_rpc.clone());
//!
//! let engine = CctpEngine::builder()
//!     .sepolia_provider(sepolia)
//!     .arc_provider(arc)
//!     .account("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d".parse().unwrap())
//!     .iris(IrisClient::new(config.iris_api.clone(), Arc::new(TokioClock::new())))
//!     .build();
//!
//! let request = TransferRequest::builder()
//!     .from(Chain::EthereumSepolia)
//!     .to(Chain::ArcTestnet)
//!     .amount("1.00")
//!     .speed(TransferSpeed::Fast)
//!     .build();
//! let estimate = engine.estimate(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&estimate)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving a bridge from a UI
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arc_bridge::testing::{FakeEngine, FakeWallet};
//! use arc_bridge::{view, BridgeSession, TokioClock, WalletConnectivity};
//!
//! # async fn example() {
//! let connectivity = WalletConnectivity::from_project_id(std::env::var("WALLETCONNECT_PROJECT_ID").ok());
//! let wallet = FakeWallet::connected(Arc::new(FakeEngine::new()));
//! let Some(mut session) = BridgeSession::open(&connectivity, wallet, TokioClock::new()) else {
//!     println!("{}", view::render_disabled_page());
//!     return;
//! };
//! session.refresh_provider().await;
//! session.set_amount("1.00");
//!
//! let outcome = session
//!     .bridge(|timeline| eprint!("{}", view::render_progress(timeline)))
//!     .await;
//! println!("{outcome:?}");
//! println!("{}", view::render_session(session.state()));
//! # }
//! ```

mod chain;
mod clock;
mod config;
mod engine;
mod error;
mod notification;
mod outcome;
mod progress;
mod session;
mod wallet;

pub mod spans;
pub mod testing;
pub mod view;

pub use chain::addresses::{
    ARC_TESTNET_USDC, CCTP_V2_MESSAGE_TRANSMITTER_TESTNET, CCTP_V2_TOKEN_MESSENGER_TESTNET,
    ETHEREUM_SEPOLIA_USDC,
};
pub use chain::{
    default_route, explorer_tx_url, supported_chains, Chain, ChainInfo,
    USDC_DECIMALS,
};
pub use clock::{Clock, TokioClock};
pub use config::{
    AppConfig, PollingConfig, WalletConnectivity, IRIS_API, IRIS_API_SANDBOX,
    IRIS_API_URL_ENV, WALLETCONNECT_PROJECT_ID_ENV,
};
pub use engine::{
    parse_usdc, AttestationProvider, AttestationStatus, AttestedMessage, BridgeResult, BurnFee,
    CctpEngine, Estimate, Fee, FeeType, GasFee, IrisApi, IrisClient, StepResult, StepState,
    TransferEngine, TransferRequest, TransferSpeed, V2Message, V2MessagesResponse,
    APPROVE_GAS_FALLBACK, BURN_GAS_FALLBACK, DEFAULT_RETRY_AFTER_SECS, MINT_GAS_LIMIT,
};
pub use error::{BridgeError, Result};
pub use notification::{Notification, NotificationCenter, NotificationKind, NOTIFICATION_TTL};
pub use outcome::{
    is_mint_failure_message, is_rejection_message, Outcome, GENERIC_FAILURE_MESSAGE,
    MINT_RETRY_MESSAGE, MISSING_TX_HASH_MESSAGE, USER_REJECTED_MESSAGE,
};
pub use progress::{
    drive, ProgressTracker, StepName, StepStatus, TerminalSignal, TransferAttempt,
    TransferStep, TransferTimeline, ATTESTATION_END, APPROVE_END, BURN_END, TICK_PERIOD,
};
pub use session::{BridgeSession, SessionState};
pub use wallet::{resolve_provider, SharedEngine, WalletConnection};
