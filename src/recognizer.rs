//! Per-frame pass: classify → dedupe/enqueue → match → idle check.

use log::{debug, info};

use crate::config::Timing;
use crate::error::GestureError;
use crate::gestures::{GestureEvent, GestureMatcher};
use crate::history::History;
use crate::idle::{IdleMonitor, TimedOut};
use crate::source::Observation;
use crate::state::StateKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub event: GestureEvent,
    pub timed_out: Option<TimedOut>,
}

#[derive(Debug)]
pub struct Recognizer {
    history: History,
    matcher: GestureMatcher,
    idle: IdleMonitor,
}

impl Recognizer {
    pub fn new(th: &Timing) -> Result<Self, GestureError> {
        if th.delta_time_ms == 0 || th.timeout_ms == 0 {
            return Err(GestureError::InvalidTiming(format!(
                "delta_time_ms={} timeout_ms={} must both be positive",
                th.delta_time_ms, th.timeout_ms
            )));
        }
        Ok(Self {
            history: History::new(th.history_depth)?,
            matcher: GestureMatcher::new(th),
            idle: IdleMonitor::new(th.timeout_ms),
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn process(&mut self, obs: &Observation, now_ms: u64) -> FrameOutcome {
        let kind = StateKind::classify(obs.regions);
        if self.history.record(kind, now_ms) {
            debug!("transition -> {}", self.history);
        }

        // a centroid only means something for a lone region
        let centroid = if obs.regions == 1 { obs.centroid } else { None };
        let event = self.matcher.evaluate(&mut self.history, centroid, now_ms);
        if let GestureEvent::Click { count } = event {
            info!("click x{} at {now_ms}ms", count.times());
        }

        let timed_out = self.idle.check(&mut self.history, now_ms);
        if let Some(t) = timed_out {
            info!(
                "history timed out (oldest entry {}ms, now {}ms); flushed",
                t.stale_since, t.at
            );
        }

        FrameOutcome { event, timed_out }
    }
}
