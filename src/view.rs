// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Plain-text rendering of session state.

use std::fmt;

use crate::chain::Chain;
use crate::clock::Clock;
use crate::config::{WalletConnectivity, WALLETCONNECT_PROJECT_ID_ENV};
use crate::engine::Estimate;
use crate::notification::{Notification, NotificationKind};
use crate::progress::{StepName, StepStatus, TransferTimeline};
use crate::session::SessionState;

/// Steps that carry a gas row in the estimate details.
const GAS_ROWS: [StepName; 3] = [StepName::Approve, StepName::Burn, StepName::Mint];

pub fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Completed => "✓",
        StepStatus::Error => "!",
        StepStatus::Active => "➤",
        StepStatus::Idle => "•",
    }
}

/// Progress sidebar.
pub struct ProgressView<'a>(pub &'a TransferTimeline);

impl fmt::Display for ProgressView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bridge Progress")?;
        for step in self.0.steps() {
            writeln!(f, "{} {}", status_icon(step.status), step.name)?;
            writeln!(f, "  {}", step.description)?;
        }
        Ok(())
    }
}

/// Gas rows for Approve, Burn and Mint, then one row per protocol fee.
/// Steps missing from the estimate are skipped.
pub struct EstimateView<'a>(pub &'a Estimate);

impl fmt::Display for EstimateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction Details")?;
        for gas in GAS_ROWS.iter().filter_map(|name| self.0.gas_fee(*name)) {
            writeln!(
                f,
                "{} Gas ({}): ~{} {}",
                gas.name,
                gas.blockchain,
                gas.formatted_fee(),
                gas.blockchain.native_symbol()
            )?;
        }
        for fee in &self.0.fees {
            writeln!(f, "{}: {} {}", fee.fee_type.as_str(), fee.amount, fee.token)?;
        }
        Ok(())
    }
}

/// Whole screen: route, action, inline error, details, progress and toast.
pub struct SessionView<'a, C: Clock>(pub &'a SessionState<C>);

impl<C: Clock> fmt::Display for SessionView<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let chain_name = |chain: Option<Chain>| chain.map_or("Select", Chain::name);

        writeln!(f, "From: {} {}", state.amount, chain_name(state.from))?;
        writeln!(f, "To:   {} {}", state.amount, chain_name(state.to))?;
        if !state.recipient.trim().is_empty() {
            writeln!(f, "Recipient: {}", state.recipient.trim())?;
        }
        writeln!(f, "[{}]", action_label(state))?;
        if let Some(error) = &state.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(estimate) = &state.estimate {
            write!(f, "\n{}", EstimateView(estimate))?;
        }
        if let Some(timeline) = state.timeline() {
            write!(f, "\n{}", ProgressView(timeline))?;
        }
        if let Some(notification) = state.notification() {
            write!(f, "\n{}", render_notification(notification))?;
        }
        Ok(())
    }
}

pub fn render_progress(timeline: &TransferTimeline) -> String {
    ProgressView(timeline).to_string()
}

pub fn render_estimate(estimate: &Estimate) -> String {
    EstimateView(estimate).to_string()
}

pub fn render_session<C: Clock>(state: &SessionState<C>) -> String {
    SessionView(state).to_string()
}

pub fn render_notification(notification: &Notification) -> String {
    let icon = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error | NotificationKind::Warning => "!",
    };
    format!("{icon} {}\n  {}\n", notification.title, notification.message)
}

/// Label of the primary button: review until a quote exists, then confirm.
pub fn action_label<C: Clock>(state: &SessionState<C>) -> &'static str {
    match (state.estimate.is_some(), state.estimating, state.bridging) {
        (true, _, true) => "Bridging...",
        (true, _, false) => "Confirm Bridge",
        (false, true, _) => "Calculating...",
        (false, false, _) => "Review Bridge",
    }
}

/// Shown instead of the bridge when wallet connectivity is disabled.
pub fn render_disabled_page() -> String {
    format!(
        "Arc Bridge\n\nSet {WALLETCONNECT_PROJECT_ID_ENV} in .env to enable wallet connection.\n"
    )
}

/// Top-level screen. Without wallet connectivity, or before a session
/// exists, only the informational page is rendered.
pub fn render_app<C: Clock>(
    connectivity: &WalletConnectivity,
    session: Option<&SessionState<C>>,
) -> String {
    match session {
        Some(state) if connectivity.is_enabled() => render_session(state),
        _ => render_disabled_page(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::engine::{Fee, FeeType, GasFee};
    use crate::progress::TerminalSignal;
    use std::time::Duration;

    fn estimate() -> Estimate {
        Estimate {
            gas_fees: vec![
                GasFee::new(StepName::Approve, Chain::EthereumSepolia, 60_000, 1_000_000_000),
                GasFee::new(StepName::Burn, Chain::EthereumSepolia, 200_000, 1_000_000_000),
                GasFee::new(StepName::Mint, Chain::ArcTestnet, 300_000, 160_000_000_000),
            ],
            fees: vec![Fee {
                fee_type: FeeType::Provider,
                amount: "0.0001".to_string(),
                token: "USDC".to_string(),
            }],
        }
    }

    #[test]
    fn test_progress_mid_burn() {
        let timeline = TransferTimeline::at(Duration::from_secs(6));
        insta::assert_snapshot!(render_progress(&timeline), @r"
        Bridge Progress
        ✓ Approve
          Approve token transfer
        ➤ Burn
          Burn tokens on source chain
        • Attestation
          Wait for CCTP attestation
        • Mint
          Mint tokens on destination chain
        ");
    }

    #[test]
    fn test_progress_after_failure() {
        let mut timeline = TransferTimeline::at(Duration::from_secs(14));
        timeline.force_terminal(TerminalSignal::Failure);
        insta::assert_snapshot!(render_progress(&timeline), @r"
        Bridge Progress
        ✓ Approve
          Approve token transfer
        ✓ Burn
          Burn tokens on source chain
        ! Attestation
          Wait for CCTP attestation
        • Mint
          Mint tokens on destination chain
        ");
    }

    #[test]
    fn test_estimate_details() {
        insta::assert_snapshot!(render_estimate(&estimate()), @r"
        Transaction Details
        Approve Gas (Ethereum_Sepolia): ~0.000060000000000000 ETH
        Burn Gas (Ethereum_Sepolia): ~0.000200000000000000 ETH
        Mint Gas (Arc_Testnet): ~0.048000000000000000 USDC
        provider: 0.0001 USDC
        ");
    }

    #[test]
    fn test_estimate_skips_missing_steps() {
        let mut partial = estimate();
        partial.gas_fees.retain(|fee| fee.name == StepName::Mint);
        partial.fees.clear();
        let rendered = render_estimate(&partial);
        assert!(!rendered.contains("Approve"));
        assert!(rendered.contains("Mint Gas"));
    }

    #[test]
    fn test_toast() {
        let toast = Notification::new(
            NotificationKind::Warning,
            "Transaction Cancelled",
            "You rejected the transaction in your wallet.",
        );
        insta::assert_snapshot!(render_notification(&toast), @r"
        ! Transaction Cancelled
          You rejected the transaction in your wallet.
        ");
    }

    #[test]
    fn test_action_labels() {
        let mut state = SessionState::new(TokioClock::new());
        assert_eq!(action_label(&state), "Review Bridge");
        state.estimating = true;
        assert_eq!(action_label(&state), "Calculating...");
        state.estimating = false;
        state.estimate = Some(estimate());
        assert_eq!(action_label(&state), "Confirm Bridge");
        state.bridging = true;
        assert_eq!(action_label(&state), "Bridging...");
    }

    #[test]
    fn test_disabled_page() {
        insta::assert_snapshot!(render_disabled_page(), @r"
        Arc Bridge

        Set WALLETCONNECT_PROJECT_ID in .env to enable wallet connection.
        ");
    }

    #[test]
    fn test_session_screen_shows_error_banner() {
        let mut state = SessionState::new(TokioClock::new());
        state.from = Some(Chain::EthereumSepolia);
        state.to = Some(Chain::ArcTestnet);
        state.amount = "1.00".to_string();
        state.error = Some("Wallet not connected".to_string());

        insta::assert_snapshot!(render_session(&state), @r"
        From: 1.00 Ethereum Sepolia
        To:   1.00 Arc Testnet
        [Review Bridge]
        Error: Wallet not connected
        ");
    }

    #[test]
    fn test_app_without_connectivity_is_informational_page() {
        let state = SessionState::new(TokioClock::new());
        assert_eq!(
            render_app(&WalletConnectivity::Disabled, Some(&state)),
            render_disabled_page()
        );
        assert_eq!(
            render_app::<TokioClock>(&WalletConnectivity::Disabled, None),
            render_disabled_page()
        );
    }

    #[test]
    fn test_app_with_connectivity_renders_session() {
        let connectivity = WalletConnectivity::from_project_id(Some("abc123".to_string()));
        let mut state = SessionState::new(TokioClock::new());
        state.amount = "1.00".to_string();

        let screen = render_app(&connectivity, Some(&state));
        assert!(screen.starts_with("From: 1.00 Select"));
        assert!(screen.contains("[Review Bridge]"));
    }
}
