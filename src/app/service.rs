//! Application service — the cooperative control loop core.
//!
//! [`AppService`] owns the flow meters, valve controllers, and the
//! telemetry publisher, and runs one iteration of the loop per
//! [`tick`](AppService::tick).  It exposes a clean, hardware-agnostic
//! API; all I/O flows through port traits injected at call sites, making
//! the entire service testable with mock adapters.
//!
//! ```text
//! ControlInputPort ──▶ ┌──────────────────────────────┐ ──▶ ValvePort
//!                      │          AppService          │ ──▶ DisplayPort
//!        (monotonic    │  valves · flow · telemetry   │ ──▶ TelemetrySink
//!         clock) ────▶ └──────────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Every subsystem runs off an independent [`Cadence`] against the same
//! monotonic millisecond clock; within one tick the order is fixed —
//! valves, flow, display, telemetry — and nothing blocks.

use core::fmt::Write as _;
use core::sync::atomic::AtomicU32;

use log::info;

use crate::cadence::Cadence;
use crate::config::SystemConfig;
use crate::control::valve::ValveController;
use crate::line::LineId;
use crate::sensors::flow::{self, FlowMeter};

use super::events::{AppEvent, VolumeReport};
use super::ports::{ControlInputPort, DisplayPort, EventSink, TelemetrySink, ValvePort};
use super::telemetry::TelemetryPublisher;

pub struct AppService {
    meters: [FlowMeter; 2],
    valves: [ValveController; 2],
    publisher: TelemetryPublisher,
    flow_cadence: [Cadence; 2],
    display_cadence: Cadence,
}

impl AppService {
    /// Construct the service wired to the ISR pulse counters.
    ///
    /// Does **not** anchor the clocks — call [`start`](AppService::start)
    /// once the loop is about to run.
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_counters(
            config,
            [
                flow::pulse_counter(LineId::Line1),
                flow::pulse_counter(LineId::Line2),
            ],
        )
    }

    /// Construct with explicit pulse counters (tests inject isolated
    /// atomics instead of the ISR-shared statics).
    pub fn with_counters(config: &SystemConfig, counters: [&'static AtomicU32; 2]) -> Self {
        Self {
            meters: counters.map(|c| FlowMeter::new(c, config.pulses_per_litre)),
            valves: LineId::ALL.map(ValveController::new),
            publisher: TelemetryPublisher::new(config.telemetry_interval_ms),
            flow_cadence: [
                Cadence::starting_at(config.flow_sample_interval_ms, 0),
                Cadence::starting_at(config.flow_sample_interval_ms, 0),
            ],
            display_cadence: Cadence::starting_at(config.display_refresh_interval_ms, 0),
        }
    }

    /// Anchor every cadence at `now_ms` and announce the start.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        for meter in &mut self.meters {
            meter.anchor(now_ms);
        }
        self.flow_cadence = self
            .flow_cadence
            .map(|c| Cadence::starting_at(c.period_ms(), now_ms));
        self.display_cadence =
            Cadence::starting_at(self.display_cadence.period_ms(), now_ms);

        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (flow@{}ms, display@{}ms)",
            self.flow_cadence[0].period_ms(),
            self.display_cadence.period_ms()
        );
    }

    /// Run one loop iteration, in fixed order: valve control, flow
    /// integration, display refresh, telemetry publish.  Each stage runs
    /// only when its own boundary is due; none blocks another.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ControlInputPort + ValvePort),
        display: &mut impl DisplayPort,
        telemetry: &mut impl TelemetrySink,
        sink: &mut impl EventSink,
    ) {
        // 1. Operator valve control — first, every iteration, so the
        //    valves stay responsive whatever the measurement path does.
        for valve in &mut self.valves {
            let request = hw.valve_request(valve.line());
            valve.poll(request, hw, sink);
        }

        // 2. Flow integration, per line at its own 1 s boundary.
        for line in LineId::ALL {
            let i = line.index();
            if self.flow_cadence[i].due(now_ms) {
                self.meters[i].sample(now_ms);
            }
        }

        // 3. Local readout.
        if self.display_cadence.due(now_ms) {
            self.refresh_display(display, sink);
        }

        // 4. Remote publish (ready-gated and window-gated internally).
        let totals = self.totals_ml();
        self.publisher.maybe_publish(now_ms, totals, telemetry, sink);
    }

    fn refresh_display(&self, display: &mut impl DisplayPort, sink: &mut impl EventSink) {
        let report = VolumeReport {
            totals_ml: self.totals_ml(),
            flow_l_per_min: [
                self.meters[0].flow_l_per_min(),
                self.meters[1].flow_l_per_min(),
            ],
        };

        // One-row glass: line 1's total is the local readout; both lines
        // go to the event sink.
        let mut text: heapless::String<24> = heapless::String::new();
        let _ = write!(
            text,
            "{}:{:.1}ml",
            LineId::Line1.label(),
            report.totals_ml[0]
        );
        display.clear();
        display.show(&text);

        sink.emit(&AppEvent::VolumeReport(report));
    }

    /// Accumulated volumes (ml), indexed by [`LineId::index`].
    pub fn totals_ml(&self) -> [f32; 2] {
        [self.meters[0].total_ml(), self.meters[1].total_ml()]
    }

    pub fn valve_open(&self, line: LineId) -> bool {
        self.valves[line.index()].is_open()
    }
}
