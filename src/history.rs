//! Fixed-depth, always-full window of the most recent hand states.

use std::fmt;

use crate::error::GestureError;
use crate::state::{State, StateKind};

pub const DEFAULT_DEPTH: usize = 5;

/// Length of the longest pattern the matcher looks for.
pub const MIN_DEPTH: usize = 5;

/// Oldest-first window of `State`s. Slots live in a boxed slice that is
/// written through a rotating cursor, so the length fixed at construction
/// can never change.
#[derive(Debug, Clone)]
pub struct History {
    slots: Box<[State]>,
    // slot holding the oldest entry; also the next slot to overwrite
    head: usize,
    generation: u64,
}

impl History {
    /// A history of `depth` slots, every one `Idle@0`.
    pub fn new(depth: usize) -> Result<Self, GestureError> {
        if depth < MIN_DEPTH {
            return Err(GestureError::InvalidDepth {
                depth,
                min: MIN_DEPTH,
            });
        }
        Ok(Self {
            slots: vec![State::idle(0); depth].into_boxed_slice(),
            head: 0,
            generation: 0,
        })
    }

    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Evict the oldest entry and append `state` as the newest.
    pub fn enqueue(&mut self, state: State) {
        self.slots[self.head] = state;
        self.head = (self.head + 1) % self.slots.len();
        self.generation += 1;
    }

    /// Enqueue `kind` only when it differs from the newest entry.
    /// Noise (`None`) and repeats are dropped. Returns whether a transition
    /// was recorded.
    pub fn record(&mut self, kind: Option<StateKind>, timestamp_ms: u64) -> bool {
        match kind {
            Some(k) if k != self.newest_kind() => {
                self.enqueue(State::new(k, timestamp_ms));
                true
            }
            _ => false,
        }
    }

    /// Overwrite every slot with `Idle@now`.
    pub fn flush(&mut self, now_ms: u64) {
        for _ in 0..self.depth() {
            self.enqueue(State::idle(now_ms));
        }
    }

    /// Entry `i` counted from the oldest (0) to the newest (`depth - 1`).
    ///
    /// # Panics
    /// If `i >= depth`.
    pub fn at(&self, i: usize) -> &State {
        assert!(i < self.depth(), "history index {i} out of range");
        &self.slots[(self.head + i) % self.slots.len()]
    }

    pub fn kind_at(&self, i: usize) -> StateKind {
        self.at(i).kind()
    }

    pub fn time_at(&self, i: usize) -> u64 {
        self.at(i).timestamp_ms()
    }

    pub fn newest(&self) -> &State {
        self.at(self.depth() - 1)
    }

    pub fn newest_kind(&self) -> StateKind {
        self.newest().kind()
    }

    pub fn oldest_time(&self) -> u64 {
        self.time_at(0)
    }

    /// Counts every enqueue, flushes included. Two equal generations mean
    /// the contents have not changed in between.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> + '_ {
        (0..self.depth()).map(move |i| self.at(i))
    }

    /// Whether the newest `pattern.len()` entries have exactly these kinds.
    pub fn ends_with(&self, pattern: &[StateKind]) -> bool {
        let depth = self.depth();
        if pattern.len() > depth {
            return false;
        }
        let start = depth - pattern.len();
        pattern
            .iter()
            .enumerate()
            .all(|(i, k)| self.kind_at(start + i) == *k)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, s) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{s}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StateKind::*;

    fn kinds(h: &History) -> Vec<StateKind> {
        h.iter().map(|s| s.kind()).collect()
    }

    #[test]
    fn test_new_is_full_of_idle() {
        let h = History::new(DEFAULT_DEPTH).unwrap();
        assert_eq!(h.depth(), 5);
        assert!(h.iter().all(|s| *s == State::idle(0)));
        assert_eq!(h.newest_kind(), Idle);
        assert_eq!(h.oldest_time(), 0);
    }

    #[test]
    fn test_rejects_shallow_depth() {
        let err = History::new(3).unwrap_err();
        assert!(matches!(err, GestureError::InvalidDepth { depth: 3, min: 5 }));
    }

    #[test]
    fn test_enqueue_evicts_oldest() {
        let mut h = History::new(5).unwrap();
        for (i, k) in [Double, Single, Double, Single, Double, Idle].into_iter().enumerate() {
            h.enqueue(State::new(k, i as u64 * 100));
        }
        assert_eq!(kinds(&h), vec![Single, Double, Single, Double, Idle]);
        assert_eq!(h.oldest_time(), 100);
        assert_eq!(h.time_at(4), 500);
    }

    #[test]
    fn test_length_never_changes() {
        let mut h = History::new(7).unwrap();
        let seq = [2, 1, 1, 0, 5, 2, 2, 1, 0, 0, 3, 1, 2, 1, 2];
        for (t, n) in seq.into_iter().enumerate() {
            h.record(StateKind::classify(n), t as u64);
            assert_eq!(h.depth(), 7);
            assert_eq!(h.iter().count(), 7);
        }
        h.flush(99);
        assert_eq!(h.iter().count(), 7);
    }

    #[test]
    fn test_record_suppresses_duplicates() {
        let mut h = History::new(5).unwrap();
        assert!(!h.record(Some(Idle), 10));
        assert!(h.record(Some(Single), 20));
        assert!(!h.record(Some(Single), 30));
        assert!(!h.record(None, 40));
        assert_eq!(h.newest(), &State::new(Single, 20));
    }

    #[test]
    fn test_organic_neighbours_differ() {
        let mut h = History::new(5).unwrap();
        h.enqueue(State::new(Double, 1));
        let counts = [1, 1, 2, 2, 2, 0, 9, 0, 1, 2, 1, 1, 4, 2];
        for (t, n) in counts.into_iter().enumerate() {
            h.record(StateKind::classify(n), 10 + t as u64);
        }
        let k = kinds(&h);
        for w in k.windows(2) {
            assert_ne!(w[0], w[1], "adjacent duplicates in {h}");
        }
    }

    #[test]
    fn test_flush_writes_idle_now() {
        let mut h = History::new(5).unwrap();
        h.record(Some(Double), 100);
        h.record(Some(Single), 200);
        h.flush(950);
        assert!(h.iter().all(|s| *s == State::idle(950)));
    }

    #[test]
    fn test_generation_tracks_enqueues() {
        let mut h = History::new(5).unwrap();
        let g0 = h.generation();
        h.record(Some(Idle), 1);
        assert_eq!(h.generation(), g0);
        h.record(Some(Single), 2);
        assert_eq!(h.generation(), g0 + 1);
        h.flush(3);
        assert_eq!(h.generation(), g0 + 6);
    }

    #[test]
    fn test_ends_with() {
        let mut h = History::new(6).unwrap();
        for (t, k) in [Double, Single, Double].into_iter().enumerate() {
            h.enqueue(State::new(k, t as u64));
        }
        assert!(h.ends_with(&[Double, Single, Double]));
        assert!(h.ends_with(&[Idle, Double, Single, Double]));
        assert!(!h.ends_with(&[Single, Double, Single]));
        assert!(!h.ends_with(&[Idle; 7]));
    }

    #[test]
    fn test_display_is_oldest_first() {
        let mut h = History::new(5).unwrap();
        h.enqueue(State::new(Double, 100));
        h.enqueue(State::new(Single, 250));
        assert_eq!(h.to_string(), "[s0@0 s0@0 s0@0 s2@100 s1@250]");
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let h = History::new(5).unwrap();
        h.kind_at(5);
    }
}
