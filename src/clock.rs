// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Time source abstraction.
//!
//! The progress tracker and the notification layer both measure elapsed time.
//! Routing that through [`Clock`] lets tests fast-forward without waiting.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Trait for time-based operations.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Phase boundaries of the progress timeline
/// - Notification expiry
/// - Attestation polling intervals
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}

/// Production clock backed by Tokio's timer.
///
/// `now` reads Tokio's clock, so a runtime with paused time (see
/// `tokio::time::pause`) observes the same instants as its timers.
///
/// # Examples
///
/// ```rust
/// use arc_bridge::TokioClock;
///
/// let clock = TokioClock::new();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

