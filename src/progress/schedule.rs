// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use super::{ProgressTracker, TransferTimeline};
use crate::clock::Clock;

/// Period of the progress timer.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Runs `work` to completion while ticking `tracker` every `period`.
///
/// Both run on the calling task, so a tick never observes a half-applied
/// outcome. The first tick fires immediately. Ticking stops as soon as the
/// timeline latches, but `work` is still awaited. The tracker is left running:
/// callers apply the outcome with [`ProgressTracker::force_terminal`] and then
/// call [`ProgressTracker::stop`].
///
/// # Panics
///
/// Panics if `period` is zero.
pub async fn drive<C, F, T>(
    tracker: &mut ProgressTracker<C>,
    period: Duration,
    work: F,
    mut on_tick: impl FnMut(&TransferTimeline),
) -> T
where
    C: Clock,
    F: Future<Output = T>,
{
    let mut work = pin!(work);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if tracker.is_latched() {
            trace!(event = "progress_timer_latched");
            return work.await;
        }

        tokio::select! {
            output = &mut work => return output,
            _ = ticker.tick() => {
                if let Some(timeline) = tracker.tick() {
                    on_tick(timeline);
                }
            }
        }
    }
}
