//! Debounced writer - collapses bursts of writes into one per key.
//!
//! Dragging a marker produces a move sample every pointer event. Local state
//! follows every sample, but the store should only see the final position:
//! 1. Every sample calls `schedule(id, payload, now)` - replaces the payload
//!    and pushes the deadline out by `delay`
//! 2. The UI loop calls `due(now)` each frame and persists what expired
//!
//! One pending entry per key, so two markers dragged back to back each get
//! their own write. `flush()` drains everything regardless of deadlines
//! (editor shutdown, deterministic tests).

use indexmap::IndexMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default quiet period before a move is persisted.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
struct PendingWrite<P> {
    payload: P,
    deadline: Instant,
}

/// Per-key debounce queue.
///
/// # Usage
/// ```ignore
/// // On every drag sample:
/// writer.schedule(id, new_time, Instant::now());
///
/// // In update loop:
/// for (id, time) in writer.due(Instant::now()) {
///     persist_move(id, time);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DebouncedWriter<K, P> {
    delay: Duration,
    pending: IndexMap<K, PendingWrite<P>>,
}

impl<K: Hash + Eq + Clone + std::fmt::Debug, P> Default for DebouncedWriter<K, P> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl<K: Hash + Eq + Clone + std::fmt::Debug, P> DebouncedWriter<K, P> {
    /// Create with custom delay
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: IndexMap::new(),
        }
    }

    /// Set delay duration (applies to future schedules)
    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay = Duration::from_millis(delay_ms);
    }

    /// Get current delay in milliseconds
    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }

    /// Schedule a write for `key`. If already pending, replaces the payload
    /// and resets the timer (debounce behavior).
    pub fn schedule(&mut self, key: K, payload: P, now: Instant) {
        let deadline = now + self.delay;
        log::trace!(
            "DebouncedWriter: scheduled {:?} in {}ms",
            key,
            self.delay.as_millis()
        );
        // Re-scheduling moves the key to the back so flush order follows recency
        self.pending.shift_remove(&key);
        self.pending.insert(key, PendingWrite { payload, deadline });
    }

    /// Cancel a pending write, returning its payload.
    pub fn cancel(&mut self, key: &K) -> Option<P> {
        let removed = self.pending.shift_remove(key).map(|p| p.payload);
        if removed.is_some() {
            log::trace!("DebouncedWriter: cancelled pending write for {:?}", key);
        }
        removed
    }

    /// Drain writes whose quiet period has elapsed at `now`.
    pub fn due(&mut self, now: Instant) -> Vec<(K, P)> {
        let expired: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| now >= p.deadline)
            .map(|(k, _)| k.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|k| {
                let p = self.pending.shift_remove(&k)?;
                log::trace!("DebouncedWriter: triggering write for {:?}", k);
                Some((k, p.payload))
            })
            .collect()
    }

    /// Drain every pending write immediately.
    pub fn flush(&mut self) -> Vec<(K, P)> {
        self.pending
            .drain(..)
            .map(|(k, p)| (k, p.payload))
            .collect()
    }

    /// Check if `key` has a pending write
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest deadline, so the UI knows when to repaint next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }
}
