//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full command
//! history without touching real GPIO or the network.

use farmflow::app::events::AppEvent;
use farmflow::app::ports::{ControlInputPort, DisplayPort, EventSink, TelemetrySink, ValvePort};
use farmflow::control::valve::ValveRequest;
use farmflow::error::TelemetryError;
use farmflow::line::LineId;

// ── MockHardware ──────────────────────────────────────────────

/// Buttons + valves: requests are set by the test, valve commands are
/// recorded in order.
#[derive(Default)]
pub struct MockHardware {
    pub requests: [ValveRequest; 2],
    pub valve_commands: Vec<(LineId, bool)>,
    pub request_reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, line: LineId, open: bool, close: bool) {
        self.requests[line.index()] = ValveRequest { open, close };
    }

    pub fn release_all(&mut self) {
        self.requests = [ValveRequest::default(); 2];
    }

    pub fn last_command_for(&self, line: LineId) -> Option<bool> {
        self.valve_commands
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|(_, open)| *open)
    }
}

impl ControlInputPort for MockHardware {
    fn valve_request(&mut self, line: LineId) -> ValveRequest {
        self.request_reads += 1;
        self.requests[line.index()]
    }
}

impl ValvePort for MockHardware {
    fn set_valve(&mut self, line: LineId, open: bool) {
        self.valve_commands.push((line, open));
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub clears: usize,
    pub lines: Vec<String>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayPort for MockDisplay {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn show(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

// ── MockTelemetry ─────────────────────────────────────────────

pub struct MockTelemetry {
    pub ready: bool,
    pub fail_path: Option<&'static str>,
    pub writes: Vec<(String, f32)>,
}

#[allow(dead_code)]
impl MockTelemetry {
    pub fn new() -> Self {
        Self {
            ready: true,
            fail_path: None,
            writes: Vec::new(),
        }
    }

    pub fn offline() -> Self {
        Self {
            ready: false,
            fail_path: None,
            writes: Vec::new(),
        }
    }
}

impl TelemetrySink for MockTelemetry {
    fn ready(&self) -> bool {
        self.ready
    }

    fn set(&mut self, path: &str, value: f32) -> Result<(), TelemetryError> {
        if self.fail_path == Some(path) {
            return Err(TelemetryError::Transport);
        }
        self.writes.push((path.to_string(), value));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
