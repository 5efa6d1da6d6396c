//! Transient, auto-dismissing notifications (toasts).
//!
//! Only persistence and playback problems end up here. Validation messages
//! stay inside the form.

use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_TOAST_TTL_MS: u64 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
    pub created: Instant,
}

impl Toast {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }
}

#[derive(Debug)]
pub struct Notifications {
    toasts: Vec<Toast>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL_MS)
    }
}

impl Notifications {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            toasts: Vec::new(),
            ttl: Duration::from_millis(ttl_ms),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn set_ttl_ms(&mut self, ttl_ms: u64) {
        self.ttl = Duration::from_millis(ttl_ms);
    }

    /// Add a toast created at `now`. A repeat of the newest toast only
    /// refreshes its timestamp.
    pub fn push_at(&mut self, level: ToastLevel, message: impl Into<String>, now: Instant) -> Uuid {
        let message = message.into();
        if let Some(last) = self.toasts.last_mut()
            && last.level == level
            && last.message == message
        {
            last.created = now;
            return last.id;
        }
        let id = Uuid::new_v4();
        self.toasts.push(Toast {
            id,
            level,
            message,
            created: now,
        });
        id
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) -> Uuid {
        self.push_at(level, message, Instant::now())
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Info, message)
    }

    /// Drop toasts older than the TTL. Returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        let ttl = self.ttl;
        self.toasts.retain(|t| t.age(now) < ttl);
        before - self.toasts.len()
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        before != self.toasts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_after_ttl() {
        let mut n = Notifications::new(4000);
        let t0 = Instant::now();
        n.push_at(ToastLevel::Error, "Failed to save", t0);
        n.push_at(ToastLevel::Info, "Saved", t0 + Duration::from_secs(3));
        assert_eq!(n.expire(t0 + Duration::from_secs(4)), 1);
        assert_eq!(n.latest().map(|t| t.message.as_str()), Some("Saved"));
        assert_eq!(n.expire(t0 + Duration::from_secs(8)), 1);
        assert!(n.is_empty());
    }

    #[test]
    fn test_repeat_refreshes_instead_of_stacking() {
        let mut n = Notifications::default();
        let t0 = Instant::now();
        let a = n.push_at(ToastLevel::Error, "offline", t0);
        let b = n.push_at(ToastLevel::Error, "offline", t0 + Duration::from_secs(3));
        assert_eq!(a, b);
        assert_eq!(n.len(), 1);
        assert_eq!(n.expire(t0 + Duration::from_secs(5)), 0);
    }

    #[test]
    fn test_dismiss() {
        let mut n = Notifications::default();
        let id = n.error("x");
        n.info("y");
        assert!(n.dismiss(id));
        assert!(!n.dismiss(id));
        assert_eq!(n.len(), 1);
    }
}
