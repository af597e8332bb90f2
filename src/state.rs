//! Discrete per-frame hand states and the region-count classifier.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// No marker visible.
    Idle,
    /// One region: a single taped finger, or both fingers touching.
    Single,
    /// Two separated regions.
    Double,
}

impl StateKind {
    /// Map a frame's region count to a kind. Any count other than 0/1/2 is
    /// noise and yields `None`.
    pub fn classify(region_count: u32) -> Option<Self> {
        match region_count {
            0 => Some(StateKind::Idle),
            1 => Some(StateKind::Single),
            2 => Some(StateKind::Double),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Idle => "s0",
            StateKind::Single => "s1",
            StateKind::Double => "s2",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    kind: StateKind,
    timestamp_ms: u64,
}

impl State {
    pub const fn new(kind: StateKind, timestamp_ms: u64) -> Self {
        Self { kind, timestamp_ms }
    }

    pub const fn idle(timestamp_ms: u64) -> Self {
        Self::new(StateKind::Idle, timestamp_ms)
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_counts() {
        assert_eq!(StateKind::classify(0), Some(StateKind::Idle));
        assert_eq!(StateKind::classify(1), Some(StateKind::Single));
        assert_eq!(StateKind::classify(2), Some(StateKind::Double));
    }

    #[test]
    fn test_classify_noise_is_ignored() {
        for n in [3, 4, 17, u32::MAX] {
            assert_eq!(StateKind::classify(n), None, "count {n} should be noise");
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(State::new(StateKind::Double, 250).to_string(), "s2@250");
        assert_eq!(State::idle(0).to_string(), "s0@0");
    }
}
