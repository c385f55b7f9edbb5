//! Server-advertised rate budget
//!
//! The Helix dialect advertises a token-bucket budget through the
//! `Ratelimit-Remaining` and `Ratelimit-Reset` response headers. This module
//! tracks that budget as shared process state: every transport created from
//! one budget handle observes the same remaining count and reset instants.
//!
//! Admission is fail-open: with an exhausted budget but no known future reset
//! instant, requests proceed immediately rather than deadlocking.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

/// Slack added past the server's reset instant so its window has rolled over
const RESET_MARGIN: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct BudgetState {
    /// Requests left in the current window, per the last seen header
    remaining: u64,
    /// Future reset instants, epoch seconds
    resets: BTreeSet<u64>,
}

/// Shared request budget derived from rate-limit response headers
///
/// Cloning shares the underlying state; one budget per process/credential.
#[derive(Debug, Clone, Default)]
pub struct RateBudget {
    inner: Arc<Mutex<BudgetState>>,
}

impl RateBudget {
    /// Create a fresh budget with no recorded headers
    pub fn new() -> Self {
        Self::default()
    }

    /// Record rate-limit headers from a response
    ///
    /// A present `remaining` replaces the count; a present `reset` instant is
    /// added to the pending set.
    pub async fn record(&self, remaining: Option<u64>, reset: Option<u64>) {
        let mut state = self.inner.lock().await;
        if let Some(remaining) = remaining {
            state.remaining = remaining;
        }
        if let Some(reset) = reset {
            state.resets.insert(reset);
        }
    }

    /// Wait until a request may be issued
    ///
    /// With budget left this returns immediately. Otherwise stale reset
    /// instants are pruned and, if a future one remains, the caller sleeps
    /// until just past the earliest.
    pub async fn acquire(&self) {
        let wait = {
            let mut state = self.inner.lock().await;
            if state.remaining > 0 {
                None
            } else {
                let now = epoch_seconds();
                state.resets.retain(|reset| *reset > now);
                state
                    .resets
                    .iter()
                    .next()
                    .map(|reset| Duration::from_secs(reset - now) + RESET_MARGIN)
            }
        };

        if let Some(wait) = wait {
            debug!(wait_ms = wait.as_millis() as u64, "waiting for rate limit reset");
            tokio::time::sleep(wait).await;
        }
    }

    /// Remaining request count, per the last seen header
    pub async fn remaining(&self) -> u64 {
        self.inner.lock().await.remaining
    }
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fresh_budget_admits_immediately() {
        // remaining starts at 0 with no known reset: fail open
        let budget = RateBudget::new();
        let start = Instant::now();
        budget.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_positive_remaining_admits_immediately() {
        let budget = RateBudget::new();
        budget.record(Some(30), Some(epoch_seconds() + 60)).await;

        let start = Instant::now();
        budget.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(budget.remaining().await, 30);
    }

    #[tokio::test]
    async fn test_exhausted_budget_waits_for_reset() {
        let budget = RateBudget::new();
        budget.record(Some(0), Some(epoch_seconds() + 1)).await;

        let start = Instant::now();
        budget.acquire().await;
        let elapsed = start.elapsed();
        // At least the margin past the reset instant, but not a full extra window
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_stale_resets_are_pruned() {
        let budget = RateBudget::new();
        budget.record(Some(0), Some(epoch_seconds() - 10)).await;

        // Only a past reset is known: prune it and proceed without sleeping
        let start = Instant::now();
        budget.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let budget = RateBudget::new();
        let other = budget.clone();
        other.record(Some(7), None).await;
        assert_eq!(budget.remaining().await, 7);
    }

    #[tokio::test]
    async fn test_remaining_header_replaces_not_decrements() {
        let budget = RateBudget::new();
        budget.record(Some(5), None).await;
        budget.record(Some(30), None).await;
        assert_eq!(budget.remaining().await, 30);

        // Absent header leaves the count untouched
        budget.record(None, Some(epoch_seconds() + 60)).await;
        assert_eq!(budget.remaining().await, 30);
    }
}
