// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Ephemeral toast notifications.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Holds at most one notification; a new one replaces the old and restarts
/// the timer.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    active: Option<(Notification, Instant)>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notification: Notification, now: Instant) {
        info!(
            kind = ?notification.kind,
            title = %notification.title,
            event = "notification_shown"
        );
        self.active = Some((notification, now + NOTIFICATION_TTL));
    }

    /// The visible notification at `now`, if it has not expired.
    pub fn current(&self, now: Instant) -> Option<&Notification> {
        self.active
            .as_ref()
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(notification, _)| notification)
    }

    /// Drops an expired notification. Returns true if one was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let expired = self
            .active
            .as_ref()
            .is_some_and(|(_, expires_at)| now >= *expires_at);
        if expired {
            self.active = None;
            debug!(event = "notification_expired");
        }
        expired
    }

    pub fn dismiss(&mut self) {
        self.active = None;
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.active.as_ref().map(|(_, expires_at)| *expires_at)
    }
}
