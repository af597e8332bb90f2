use serde::Serialize;

use crate::config::Timing;
use crate::history::History;
use crate::state::StateKind::{self, Double, Single};

const DOUBLE_CLICK: [StateKind; 5] = [Double, Single, Double, Single, Double];
const SINGLE_CLICK: [StateKind; 3] = [Double, Single, Double];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickCount {
    Single,
    Double,
}

impl ClickCount {
    pub fn times(self) -> u8 {
        match self {
            ClickCount::Single => 1,
            ClickCount::Double => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    None,
    Move { x: i32, y: i32 },
    Click { count: ClickCount },
}

#[derive(Debug)]
pub struct GestureMatcher {
    delta_time_ms: u64,
    flush_on_double_click: bool,
    // history generation right after the last double-click fired; the
    // entries enqueued up to then belong to that click
    consumed_through: Option<u64>,
}

impl GestureMatcher {
    pub fn new(th: &Timing) -> Self {
        Self {
            delta_time_ms: th.delta_time_ms,
            flush_on_double_click: th.flush_on_double_click,
            consumed_through: None,
        }
    }

    /// Evaluate the click/move rules against `history` for one frame.
    ///
    /// Rules are tried in priority order: double-click, single-click, move.
    /// A single-click flushes `history` to `Idle@now` so the same strokes
    /// cannot match again. A double-click either flushes too
    /// (`flush_on_double_click`) or marks its strokes as consumed: no later
    /// click may be built from them, except for the final open state, which
    /// is also where the next click starts. A triple click is therefore a
    /// double-click followed by a single-click.
    pub fn evaluate(
        &mut self,
        history: &mut History,
        centroid: Option<(i32, i32)>,
        now_ms: u64,
    ) -> GestureEvent {
        if !self.reuses_consumed(history, DOUBLE_CLICK.len()) && self.is_double_click(history) {
            if self.flush_on_double_click {
                history.flush(now_ms);
            } else {
                self.consumed_through = Some(history.generation());
            }
            return GestureEvent::Click {
                count: ClickCount::Double,
            };
        }

        if !self.reuses_consumed(history, SINGLE_CLICK.len())
            && self.is_single_click(history, now_ms)
        {
            history.flush(now_ms);
            return GestureEvent::Click {
                count: ClickCount::Single,
            };
        }

        if history.newest_kind() == Single {
            if let Some((x, y)) = centroid {
                return GestureEvent::Move { x, y };
            }
        }

        GestureEvent::None
    }

    /// Whether a pattern of `len` entries ending at the newest one would
    /// include a consumed entry other than the last one.
    fn reuses_consumed(&self, history: &History, len: usize) -> bool {
        match self.consumed_through {
            Some(g) => history.generation().saturating_sub(g) < (len - 1) as u64,
            None => false,
        }
    }

    fn is_double_click(&self, history: &History) -> bool {
        if !history.ends_with(&DOUBLE_CLICK) {
            return false;
        }
        let newest = history.depth() - 1;
        let first = history.depth() - DOUBLE_CLICK.len();
        let span = history.time_at(newest).saturating_sub(history.time_at(first));
        span <= self.delta_time_ms
    }

    // only once the settle window has passed with no further transition,
    // otherwise this could be the first half of a double-click
    fn is_single_click(&self, history: &History, now_ms: u64) -> bool {
        history.ends_with(&SINGLE_CLICK)
            && now_ms.saturating_sub(history.newest().timestamp_ms()) > self.delta_time_ms
    }
}
