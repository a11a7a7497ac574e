// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Simulated bridge progress
//!
//! A bridge call exposes only its start and its resolution. The tracker turns
//! elapsed time into a believable four-step timeline ([`TransferTimeline`])
//! and lets the real outcome override it when the call resolves. The pure
//! time-to-timeline derivation lives in [`timeline`]; the fixed-period timer
//! that feeds it lives in [`schedule`].

mod schedule;
mod timeline;

pub use schedule::{drive, TICK_PERIOD};
pub use timeline::{
    StepName, StepStatus, TerminalSignal, TransferStep, TransferTimeline, APPROVE_END,
    ATTESTATION_END, BURN_END,
};

use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::clock::Clock;

/// One in-flight bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAttempt {
    started_at: Instant,
}

impl TransferAttempt {
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}

/// Owner of the transfer timeline.
///
/// No other component writes to the timeline; views read it through
/// [`timeline`](Self::timeline). The last timeline stays visible after
/// [`stop`](Self::stop) until the next [`start`](Self::start) or
/// [`clear`](Self::clear).
#[derive(Debug, Clone)]
pub struct ProgressTracker<C: Clock> {
    clock: C,
    timeline: Option<TransferTimeline>,
    attempt: Option<TransferAttempt>,
}

impl<C: Clock> ProgressTracker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            timeline: None,
            attempt: None,
        }
    }

    /// Begins a new attempt with Approve active and the clock at zero.
    pub fn start(&mut self) -> &TransferTimeline {
        let started_at = self.clock.now();
        self.attempt = Some(TransferAttempt { started_at });
        info!(event = "progress_started");
        self.timeline.insert(TransferTimeline::started())
    }

    /// Recomputes the timeline from elapsed time.
    ///
    /// Returns `None` when no attempt is running. A latched timeline is
    /// returned unchanged.
    pub fn tick(&mut self) -> Option<&TransferTimeline> {
        let attempt = self.attempt?;
        let elapsed = attempt.elapsed(self.clock.now());
        let timeline = self.timeline.as_mut()?;

        let next = timeline.tick(elapsed);
        if next != *timeline {
            debug!(
                elapsed_ms = saturating_millis(elapsed),
                active_step = ?next.active_step(),
                event = "progress_advanced"
            );
            *timeline = next;
        }
        Some(&*timeline)
    }

    /// Applies the real outcome to the displayed timeline.
    pub fn force_terminal(&mut self, signal: TerminalSignal) {
        if let Some(timeline) = self.timeline.as_mut() {
            let failed_step = timeline.active_step();
            timeline.force_terminal(signal);
            info!(
                signal = ?signal,
                failed_step = ?failed_step.filter(|_| signal == TerminalSignal::Failure),
                event = "progress_terminal"
            );
        }
    }

    /// Halts the attempt; the timeline stays as it was last displayed.
    pub fn stop(&mut self) {
        if self.attempt.take().is_some() {
            debug!(event = "progress_stopped");
        }
    }

    /// Drops the timeline entirely, e.g. when a new estimate is requested.
    pub fn clear(&mut self) {
        self.attempt = None;
        self.timeline = None;
    }

    pub fn is_running(&self) -> bool {
        self.attempt.is_some()
    }

    /// True once the timeline can no longer change on its own.
    pub fn is_latched(&self) -> bool {
        self.timeline
            .as_ref()
            .is_some_and(TransferTimeline::is_terminal)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.attempt
            .map(|attempt| attempt.elapsed(self.clock.now()))
    }

    pub fn attempt(&self) -> Option<&TransferAttempt> {
        self.attempt.as_ref()
    }

    pub fn timeline(&self) -> Option<&TransferTimeline> {
        self.timeline.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
