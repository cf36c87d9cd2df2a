//! Retry bookkeeping: the attempt ledger and the backoff policy.
//!
//! The ledger is an explicit, clonable component owned by the application
//! root and injected into the error handler. Clones share state, so one
//! logical retry sequence is visible to every handler that shares the
//! instance; separate instances are fully isolated, which keeps tests clean.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A single retry sequence under one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RetryEntry {
    /// Failures counted so far under this key.
    attempts: u32,
    /// Monotonic id assigned on every bump. A scheduled cleanup captured an
    /// older generation when a newer sequence is already in flight, and must
    /// not erase it.
    generation: u64,
}

/// Shared mapping from retry key to attempt count.
///
/// All mutation happens through [`bump`](RetryLedger::bump),
/// [`clear`](RetryLedger::clear) and
/// [`clear_if_generation`](RetryLedger::clear_if_generation); entries are
/// created on first bump and removed on clear, so the map only ever holds
/// in-flight sequences.
#[derive(Clone, Debug, Default)]
pub struct RetryLedger {
    entries: Arc<Mutex<HashMap<String, RetryEntry>>>,
    next_generation: Arc<AtomicU64>,
}

impl RetryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current attempt count for a key, 0 if absent.
    pub fn attempts(&self, key: &str) -> u32 {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|entry| entry.attempts).unwrap_or(0)
    }

    /// Increments the attempt count for a key, creating the entry if absent.
    ///
    /// Returns the post-increment count. Every bump assigns the entry a
    /// fresh generation.
    pub fn bump(&self, key: &str) -> u32 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key.to_string()).or_insert(RetryEntry {
            attempts: 0,
            generation,
        });
        entry.attempts += 1;
        entry.generation = generation;
        entry.attempts
    }

    /// Returns the generation of a key's entry, if present.
    pub fn generation(&self, key: &str) -> Option<u64> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|entry| entry.generation)
    }

    /// Removes the entry for a key. Idempotent.
    pub fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
    }

    /// Removes the entry for a key only if its generation still matches.
    ///
    /// Used by the post-retry cleanup window: if the key failed again in the
    /// meantime, the entry carries a newer generation and the stale cleanup
    /// becomes a no-op.
    pub fn clear_if_generation(&self, key: &str, generation: u64) {
        let mut entries = self.entries.lock().unwrap();
        if entries.get(key).map(|entry| entry.generation) == Some(generation) {
            entries.remove(key);
        }
    }

    /// Returns the number of in-flight retry sequences.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }

    /// Returns true if no retry sequence is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backoff policy for automatic retries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum automatic attempts before the final failure notice.
    pub max_retries: u32,
    /// Delay before each scheduled retry, indexed by prior attempt count and
    /// clamped to the last entry.
    pub delays: Vec<Duration>,
    /// Quiet window after a retry fires before its ledger entry is cleared.
    pub cleanup_window: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![
                Duration::ZERO,
                Duration::from_millis(2000),
                Duration::from_millis(5000),
            ],
            cleanup_window: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Creates the default policy: 3 attempts at 0ms, 2s, 5s.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of automatic attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay schedule.
    pub fn with_delays(mut self, delays: Vec<Duration>) -> Self {
        self.delays = delays;
        self
    }

    /// Sets the post-retry cleanup window.
    pub fn with_cleanup_window(mut self, window: Duration) -> Self {
        self.cleanup_window = window;
        self
    }

    /// Returns the delay before the retry following `attempts` prior
    /// failures. Indexes past the table clamp to the last entry.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        if self.delays.is_empty() {
            return Duration::ZERO;
        }
        let index = (attempts as usize).min(self.delays.len() - 1);
        self.delays[index]
    }

    /// Returns true if another automatic retry is allowed after `attempts`
    /// prior failures.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_zero_for_absent_key() {
        let ledger = RetryLedger::new();
        assert_eq!(ledger.attempts("missing"), 0);
    }

    #[test]
    fn test_bump_creates_and_increments() {
        let ledger = RetryLedger::new();
        assert_eq!(ledger.bump("load-profile"), 1);
        assert_eq!(ledger.bump("load-profile"), 2);
        assert_eq!(ledger.bump("load-profile"), 3);
        assert_eq!(ledger.attempts("load-profile"), 3);
    }

    #[test]
    fn test_keys_are_independent() {
        let ledger = RetryLedger::new();
        ledger.bump("a");
        ledger.bump("a");
        ledger.bump("b");
        assert_eq!(ledger.attempts("a"), 2);
        assert_eq!(ledger.attempts("b"), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let ledger = RetryLedger::new();
        ledger.bump("a");
        ledger.clear("a");
        ledger.clear("a");
        assert_eq!(ledger.attempts("a"), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_bump_advances_generation() {
        let ledger = RetryLedger::new();
        ledger.bump("a");
        let first = ledger.generation("a").unwrap();
        ledger.bump("a");
        let second = ledger.generation("a").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_clear_if_generation_matches() {
        let ledger = RetryLedger::new();
        ledger.bump("a");
        let generation = ledger.generation("a").unwrap();
        ledger.clear_if_generation("a", generation);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clear_if_generation_stale_is_noop() {
        let ledger = RetryLedger::new();
        ledger.bump("a");
        let stale = ledger.generation("a").unwrap();
        // A new failure sequence bumps the key before the cleanup fires.
        ledger.bump("a");
        ledger.clear_if_generation("a", stale);
        assert_eq!(ledger.attempts("a"), 2);
    }

    #[test]
    fn test_clear_if_generation_absent_key() {
        let ledger = RetryLedger::new();
        ledger.clear_if_generation("missing", 7);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clone_shares_state() {
        let ledger = RetryLedger::new();
        let clone = ledger.clone();
        ledger.bump("a");
        assert_eq!(clone.attempts("a"), 1);
        clone.clear("a");
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_separate_instances_are_isolated() {
        let first = RetryLedger::new();
        let second = RetryLedger::new();
        first.bump("a");
        assert_eq!(second.attempts("a"), 0);
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delays.len(), 3);
        assert_eq!(policy.cleanup_window, Duration::from_millis(5000));
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(5000));
    }

    #[test]
    fn test_delay_clamps_past_table() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(3), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(100), Duration::from_millis(5000));
    }

    #[test]
    fn test_delay_with_empty_table() {
        let policy = RetryPolicy::default().with_delays(vec![]);
        assert_eq!(policy.delay_for(0), Duration::ZERO);
        assert_eq!(policy.delay_for(5), Duration::ZERO);
    }

    #[test]
    fn test_allows_retry_respects_cap() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
        assert!(!policy.allows_retry(4));
    }

    #[test]
    fn test_policy_builder() {
        let policy = RetryPolicy::new()
            .with_max_retries(5)
            .with_delays(vec![Duration::from_millis(10)])
            .with_cleanup_window(Duration::from_millis(50));
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(4), Duration::from_millis(10));
        assert_eq!(policy.cleanup_window, Duration::from_millis(50));
    }
}
