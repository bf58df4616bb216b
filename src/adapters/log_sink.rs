//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::VolumeReport(r) => {
                info!(
                    "VOLUME | V1={:.1}ml ({:.2}L/min) | V2={:.1}ml ({:.2}L/min)",
                    r.totals_ml[0], r.flow_l_per_min[0], r.totals_ml[1], r.flow_l_per_min[1],
                );
            }
            AppEvent::ValveChanged { line, open } => {
                info!("VALVE | {} -> {}", line, if *open { "OPEN" } else { "CLOSED" });
            }
            AppEvent::TelemetryPublished { totals_ml } => {
                info!(
                    "TELEM | published volume1={:.1}ml volume2={:.1}ml",
                    totals_ml[0], totals_ml[1]
                );
            }
            AppEvent::TelemetryChannelFailed { path, reason } => {
                warn!("TELEM | {} failed: {}", path, reason);
            }
            AppEvent::Started => {
                info!("START | control loop running");
            }
        }
    }
}
