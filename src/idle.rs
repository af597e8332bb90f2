//! Idle timeout: discards stale history so old strokes cannot combine with a
//! freshly started gesture.

use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut {
    /// Timestamp of the oldest entry that went stale.
    pub stale_since: u64,
    pub at: u64,
}

#[derive(Debug)]
pub struct IdleMonitor {
    timeout_ms: u64,
}

impl IdleMonitor {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    pub fn check(&self, history: &mut History, now_ms: u64) -> Option<TimedOut> {
        let oldest = history.oldest_time();
        if now_ms.saturating_sub(oldest) <= self.timeout_ms {
            return None;
        }
        history.flush(now_ms);
        Some(TimedOut {
            stale_since: oldest,
            at: now_ms,
        })
    }
}
