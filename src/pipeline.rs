use anyhow::Result;
use log::{error, info, warn};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::actions::{Button, PointerSink};
use crate::clock::Clock;
use crate::dispatch::dispatch_event;
use crate::error::GestureError;
use crate::gestures::GestureEvent;
use crate::recognizer::Recognizer;
use crate::source::ObservationSource;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub events: u64,
    pub timeouts: u64,
    pub skipped: u64,
}

/// Drive `sink` from `source` until the stream ends or `stop` is raised.
/// `stop` is only checked between frames. A line that does not parse is
/// logged and skipped; a failing read ends the loop with an error.
pub fn run_pipeline(
    source: &mut dyn ObservationSource,
    recognizer: &mut Recognizer,
    sink: &mut dyn PointerSink,
    button: Button,
    clock: &dyn Clock,
    stop: &AtomicBool,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();

    while !stop.load(Ordering::Relaxed) {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("observation stream ended");
                break;
            }
            Err(e @ GestureError::MalformedObservation { .. }) => {
                warn!("skipping frame: {e}");
                stats.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let now = frame.t_ms.unwrap_or_else(|| clock.now_ms());
        let out = recognizer.process(&frame.observation, now);

        stats.frames += 1;
        if out.timed_out.is_some() {
            stats.timeouts += 1;
        }
        if out.event != GestureEvent::None {
            stats.events += 1;
            if let Err(e) = dispatch_event(&out.event, button, sink) {
                error!("dispatch failed: {e}");
            }
        }
    }

    info!(
        "pipeline stopped after {} frames ({} events, {} timeouts, {} skipped)",
        stats.frames, stats.events, stats.timeouts, stats.skipped
    );
    Ok(stats)
}

/// Run recorded frames through `recognizer`, writing one JSON line per
/// emitted event or timeout instead of touching the pointer. Unlike
/// [`run_pipeline`], the first malformed line aborts the replay.
pub fn replay(
    source: &mut dyn ObservationSource,
    recognizer: &mut Recognizer,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats::default();

    while let Some(frame) = source.next_frame()? {
        let now = frame.t_ms.unwrap_or_else(|| clock.now_ms());
        let res = recognizer.process(&frame.observation, now);
        stats.frames += 1;

        if res.event != GestureEvent::None {
            stats.events += 1;
            let mut line = serde_json::to_value(res.event)?;
            line["t_ms"] = now.into();
            writeln!(out, "{line}")?;
        }
        if let Some(t) = res.timed_out {
            stats.timeouts += 1;
            let line = serde_json::json!({
                "event": "timed_out",
                "t_ms": t.at,
                "stale_since": t.stale_since,
            });
            writeln!(out, "{line}")?;
        }
    }
    Ok(stats)
}
