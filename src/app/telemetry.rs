//! Telemetry publish policy.
//!
//! Snapshots both lines' accumulated volumes and pushes them to the
//! remote store once per publish window.  Channels are written
//! independently: a failure on one never skips the other, and nothing is
//! retried within a cycle — the next window publishes the then-current
//! (further-accumulated) totals, so a transient failure loses that
//! snapshot's value but never the underlying volume.

use log::{info, warn};

use crate::cadence::Cadence;
use crate::line::LineId;

use super::events::AppEvent;
use super::ports::{EventSink, TelemetrySink};

pub struct TelemetryPublisher {
    cadence: Cadence,
}

impl TelemetryPublisher {
    /// A fresh publisher fires on its first ready opportunity, then at
    /// most once per `interval_ms`.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            cadence: Cadence::new(interval_ms),
        }
    }

    /// Attempt one publish cycle.
    ///
    /// Returns `None` when the sink is not ready or the window has not
    /// elapsed; `Some(success)` when a cycle ran, with `success` the AND
    /// of all per-channel outcomes.  Never propagates sink failures.
    ///
    /// The ready check comes first so an offline store does not consume
    /// the window — the cycle is skipped entirely and re-checked on the
    /// next loop iteration.
    pub fn maybe_publish(
        &mut self,
        now_ms: u64,
        totals_ml: [f32; 2],
        sink: &mut impl TelemetrySink,
        events: &mut impl EventSink,
    ) -> Option<bool> {
        if !sink.ready() {
            return None;
        }
        if !self.cadence.due(now_ms) {
            return None;
        }

        let mut success = true;
        for line in LineId::ALL {
            let value = totals_ml[line.index()];
            if let Err(reason) = sink.set(line.volume_path(), value) {
                warn!(
                    "telemetry: {} write failed: {}",
                    line.volume_path(),
                    reason
                );
                events.emit(&AppEvent::TelemetryChannelFailed {
                    path: line.volume_path(),
                    reason,
                });
                success = false;
            }
        }

        if success {
            info!(
                "telemetry: published volume1={:.1}ml volume2={:.1}ml",
                totals_ml[0], totals_ml[1]
            );
            events.emit(&AppEvent::TelemetryPublished { totals_ml });
        }

        Some(success)
    }
}
