// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for contact submissions.
//!
//! Each client key gets `max_requests` submissions per window. The window
//! restarts from scratch once it has elapsed, so a client can land up to
//! twice the limit in quick succession across a window boundary.
//!
//! State is in memory and per process: a restart forgets every quota, and
//! several instances behind a load balancer each keep their own count.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Client key used when a request carries nothing that identifies its sender.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window, after this one
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// How long the client should wait before trying again
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    /// Submissions seen in the current window
    count: u32,
    /// When the current window began
    window_start: Instant,
}

impl RateLimitRecord {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.duration_since(self.window_start) > window
    }
}

/// Thread-safe rate limiter keyed by client identifier.
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a submission attempt for `key` and decide whether it may proceed.
    ///
    /// Check and increment happen under one lock, so concurrent calls for the
    /// same key can never admit more than `max_requests` per window.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let max = self.config.max_requests;

        let mut records = self.records.lock().await;
        let record = records
            .entry(key.to_owned())
            .or_insert_with(|| RateLimitRecord::fresh(now));

        if record.expired(now, window) {
            *record = RateLimitRecord::fresh(now);
        }

        if record.count >= max {
            debug!(key, count = record.count, "Client rate limit exceeded");
            return RateLimitResult::Limited {
                retry_after: window,
            };
        }

        record.count += 1;
        RateLimitResult::Allowed {
            remaining: max - record.count,
            reset_in: window.saturating_sub(now.duration_since(record.window_start)),
        }
    }

    /// Record a submission attempt and return only whether it is admitted.
    pub async fn allow(&self, key: &str) -> bool {
        self.check(key).await.is_allowed()
    }

    /// Drop every record whose window has elapsed. Returns how many went.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window_duration();

        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.expired(now, window));
        let removed = before - records.len();

        if removed > 0 {
            debug!(removed, tracked = records.len(), "Swept expired rate limit records");
        }
        removed
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Start sweeping expired records once per window on a background task.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweepTask {
        // interval() panics on a zero period
        let period = self.config.window_duration().max(Duration::from_secs(1));
        let limiter = Arc::clone(self);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        limiter.sweep().await;
                    }
                    // Fires on an explicit stop and when the SweepTask is dropped
                    _ = &mut stop_rx => break,
                }
            }

            debug!("Rate limit sweeper stopped");
        });

        SweepTask {
            stop: stop_tx,
            handle,
        }
    }
}

/// Handle to the background sweep started by [`RateLimiter::spawn_sweeper`].
///
/// Dropping the handle also stops the sweep.
pub struct SweepTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweepTask {
    /// Signal the sweeper and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.handle.await {
            warn!(error = %err, "Rate limit sweeper did not shut down cleanly");
        }
    }
}
