// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Four-step transfer timeline derived from elapsed wall-clock time.
//!
//! Only the start and the resolution of a bridge call are observable, so the
//! intermediate phases are an approximation: each step is assumed to occupy a
//! fixed window of time. This is a UX indicator, not a trace of engine events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Approve is active until this boundary.
pub const APPROVE_END: Duration = Duration::from_millis(4_000);
/// Burn is active until this boundary.
pub const BURN_END: Duration = Duration::from_millis(12_000);
/// Attestation is active until this boundary; Mint is active afterwards.
pub const ATTESTATION_END: Duration = Duration::from_millis(25_000);

/// One phase of a bridge operation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    Approve,
    Burn,
    #[serde(alias = "fetchAttestation")]
    Attestation,
    Mint,
}

impl StepName {
    pub const ALL: [StepName; 4] = [
        StepName::Approve,
        StepName::Burn,
        StepName::Attestation,
        StepName::Mint,
    ];

    pub const fn description(self) -> &'static str {
        match self {
            Self::Approve => "Approve token transfer",
            Self::Burn => "Burn tokens on source chain",
            Self::Attestation => "Wait for CCTP attestation",
            Self::Mint => "Mint tokens on destination chain",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Burn => "Burn",
            Self::Attestation => "Attestation",
            Self::Mint => "Mint",
        }
    }

    /// Status of this step when `elapsed` time has passed since the start.
    fn status_at(self, elapsed: Duration) -> StepStatus {
        let (begin, end) = match self {
            Self::Approve => (Duration::ZERO, Some(APPROVE_END)),
            Self::Burn => (APPROVE_END, Some(BURN_END)),
            Self::Attestation => (BURN_END, Some(ATTESTATION_END)),
            Self::Mint => (ATTESTATION_END, None),
        };

        match end {
            Some(end) if elapsed >= end => StepStatus::Completed,
            _ if elapsed >= begin => StepStatus::Active,
            _ => StepStatus::Idle,
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Idle,
    Active,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferStep {
    pub name: StepName,
    pub status: StepStatus,
    pub description: &'static str,
}

impl TransferStep {
    fn new(name: StepName, status: StepStatus) -> Self {
        Self {
            name,
            status,
            description: name.description(),
        }
    }
}

/// How a transfer ended, as far as the timeline is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSignal {
    Success,
    Failure,
}

/// Ordered sequence of the four transfer steps.
///
/// At most one step is active; steps before it are completed and steps after
/// it are idle. Once a step is in error, or Mint is completed, the timeline is
/// latched and [`tick`](Self::tick) no longer changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferTimeline {
    steps: [TransferStep; 4],
}

impl TransferTimeline {
    /// Timeline at the moment a bridge begins: Approve active, the rest idle.
    pub fn started() -> Self {
        Self::at(Duration::ZERO)
    }

    /// Pure derivation of the timeline from elapsed time.
    pub fn at(elapsed: Duration) -> Self {
        Self {
            steps: StepName::ALL.map(|name| TransferStep::new(name, name.status_at(elapsed))),
        }
    }

    /// Advances the timeline to `elapsed` unless it is latched.
    pub fn tick(&self, elapsed: Duration) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        Self::at(elapsed)
    }

    pub fn is_terminal(&self) -> bool {
        self.steps.iter().any(|step| {
            step.status == StepStatus::Error
                || (step.name == StepName::Mint && step.status == StepStatus::Completed)
        })
    }

    /// Overrides the simulated state with a real outcome.
    ///
    /// Success completes every step. Failure flips the active step (if any) to
    /// error and leaves the others untouched.
    pub fn force_terminal(&mut self, signal: TerminalSignal) {
        for step in &mut self.steps {
            match signal {
                TerminalSignal::Success => step.status = StepStatus::Completed,
                TerminalSignal::Failure if step.status == StepStatus::Active => {
                    step.status = StepStatus::Error
                }
                TerminalSignal::Failure => {}
            }
        }
    }

    pub fn active_step(&self) -> Option<StepName> {
        self.steps
            .iter()
            .find(|step| step.status == StepStatus::Active)
            .map(|step| step.name)
    }

    pub fn status_of(&self, name: StepName) -> StepStatus {
        self.steps[name as usize].status
    }

    pub fn steps(&self) -> &[TransferStep; 4] {
        &self.steps
    }
}

impl Default for TransferTimeline {
    fn default() -> Self {
        Self::started()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use StepStatus::{Active, Completed, Error, Idle};

    fn statuses(timeline: &TransferTimeline) -> [StepStatus; 4] {
        timeline.steps().map(|step| step.status)
    }

    #[rstest]
    #[case(0, [Active, Idle, Idle, Idle])]
    #[case(3_999, [Active, Idle, Idle, Idle])]
    #[case(4_000, [Completed, Active, Idle, Idle])]
    #[case(11_999, [Completed, Active, Idle, Idle])]
    #[case(12_000, [Completed, Completed, Active, Idle])]
    #[case(24_999, [Completed, Completed, Active, Idle])]
    #[case(25_000, [Completed, Completed, Completed, Active])]
    #[case(600_000, [Completed, Completed, Completed, Active])]
    fn test_phase_boundaries(#[case] elapsed_ms: u64, #[case] expected: [StepStatus; 4]) {
        let timeline = TransferTimeline::at(Duration::from_millis(elapsed_ms));
        assert_eq!(statuses(&timeline), expected);
    }

    #[test]
    fn test_started_timeline() {
        let timeline = TransferTimeline::started();
        assert_eq!(timeline.active_step(), Some(StepName::Approve));
        assert!(!timeline.is_terminal());
        assert_eq!(
            timeline.steps()[2].description,
            "Wait for CCTP attestation"
        );
    }

    #[test]
    fn test_at_most_one_active_step() {
        for ms in (0..40_000).step_by(500) {
            let timeline = TransferTimeline::at(Duration::from_millis(ms));
            let active = timeline
                .steps()
                .iter()
                .filter(|step| step.status == Active)
                .count();
            assert_eq!(active, 1, "elapsed {ms}ms");
        }
    }

    #[test]
    fn test_error_latches_timeline() {
        let mut timeline = TransferTimeline::at(Duration::from_millis(6_000));
        timeline.force_terminal(TerminalSignal::Failure);
        assert_eq!(statuses(&timeline), [Completed, Error, Idle, Idle]);

        let later = timeline.tick(Duration::from_millis(30_000));
        assert_eq!(later, timeline);
        assert_eq!(later.tick(Duration::from_millis(90_000)), timeline);
    }

    #[test]
    fn test_success_completes_every_step() {
        let mut timeline = TransferTimeline::at(Duration::from_millis(13_000));
        timeline.force_terminal(TerminalSignal::Success);
        assert_eq!(statuses(&timeline), [Completed; 4]);
        assert!(timeline.is_terminal());
        assert_eq!(timeline.tick(Duration::from_millis(1_000)), timeline);
    }

    #[test]
    fn test_failure_without_active_step_changes_nothing() {
        let mut timeline = TransferTimeline::at(Duration::ZERO);
        timeline.force_terminal(TerminalSignal::Success);
        let before = timeline.clone();
        timeline.force_terminal(TerminalSignal::Failure);
        assert_eq!(timeline, before);
    }

    #[test]
    fn test_step_name_serde() {
        assert_eq!(
            serde_json::to_string(&StepName::Attestation).unwrap(),
            r#""attestation""#
        );
        let parsed: StepName = serde_json::from_str(r#""fetchAttestation""#).unwrap();
        assert_eq!(parsed, StepName::Attestation);
    }
}
