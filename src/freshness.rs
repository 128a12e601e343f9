//! Request Freshness and Busy Flags
//!
//! `RequestTracker` hands out a monotonically increasing token per entity
//! key; only the response carrying the latest token may be applied.
//! `BusyGuard` holds a loading flag for the lifetime of one action.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use leptos::prelude::*;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    key: String,
    seq: u64,
}

#[derive(Clone, Default, Debug)]
pub struct RequestTracker {
    latest: Arc<Mutex<HashMap<String, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `key`, superseding any earlier one
    pub fn issue(&self, key: impl Into<String>) -> RequestToken {
        let key = key.into();
        let mut latest = self.latest.lock();
        let seq = latest.entry(key.clone()).or_insert(0);
        *seq += 1;
        RequestToken { key, seq: *seq }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        let current = self.latest.lock().get(&token.key).copied() == Some(token.seq);
        if !current {
            tracing::debug!(key = %token.key, seq = token.seq, "discarding stale response");
        }
        current
    }

    /// Supersede whatever is in flight for `key` without starting anything
    pub fn invalidate(&self, key: &str) {
        if let Some(seq) = self.latest.lock().get_mut(key) {
            *seq += 1;
        }
    }
}

// ========================
// Busy Flag
// ========================

pub trait BusyFlag {
    fn is_busy(&self) -> bool;
    fn set_busy(&self, busy: bool);
}

impl BusyFlag for RwSignal<bool> {
    fn is_busy(&self) -> bool {
        self.get_untracked()
    }

    fn set_busy(&self, busy: bool) {
        self.set(busy);
    }
}

impl BusyFlag for &Cell<bool> {
    fn is_busy(&self) -> bool {
        self.get()
    }

    fn set_busy(&self, busy: bool) {
        self.set(busy);
    }
}

/// Clears its flag when dropped, whichever way the action exits
#[must_use = "the flag is released as soon as the guard is dropped"]
pub struct BusyGuard<F: BusyFlag> {
    flag: F,
}

impl<F: BusyFlag> BusyGuard<F> {
    /// `None` when the flag is already held (duplicate submission)
    pub fn try_acquire(flag: F) -> Option<Self> {
        if flag.is_busy() {
            tracing::debug!("action already running");
            return None;
        }
        flag.set_busy(true);
        Some(Self { flag })
    }
}

impl<F: BusyFlag> Drop for BusyGuard<F> {
    fn drop(&mut self) {
        self.flag.set_busy(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_wins() {
        let tracker = RequestTracker::new();
        let first = tracker.issue("instance:7");
        let second = tracker.issue("instance:7");
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = RequestTracker::new();
        let a = tracker.issue("template:1");
        let b = tracker.issue("template:2");
        assert!(tracker.is_current(&a));
        assert!(tracker.is_current(&b));
    }

    #[test]
    fn test_invalidate_supersedes_in_flight() {
        let tracker = RequestTracker::new();
        let token = tracker.issue("compare");
        tracker.invalidate("compare");
        assert!(!tracker.is_current(&token));
        tracker.invalidate("never-issued");
    }

    #[test]
    fn test_busy_guard_blocks_duplicates_and_releases() {
        let flag = Cell::new(false);
        {
            let guard = BusyGuard::try_acquire(&flag);
            assert!(guard.is_some());
            assert!(flag.get());
            assert!(BusyGuard::try_acquire(&flag).is_none());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_busy_guard_releases_on_early_return() {
        fn run(flag: &Cell<bool>, fail: bool) -> Result<(), String> {
            let _busy = BusyGuard::try_acquire(flag).ok_or("busy")?;
            if fail {
                return Err("boom".into());
            }
            Ok(())
        }

        let flag = Cell::new(false);
        assert!(run(&flag, true).is_err());
        assert!(!flag.get());
        assert!(run(&flag, false).is_ok());
        assert!(!flag.get());
    }
}
