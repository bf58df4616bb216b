//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns both valve drivers and reads the operator buttons, exposing them
//! through [`ValvePort`] and [`ControlInputPort`].  On non-espidf targets
//! the underlying GPIO helpers are simulation stubs (all inputs idle).

use crate::app::ports::{ControlInputPort, ValvePort};
use crate::control::valve::ValveRequest;
use crate::drivers::hw_init;
use crate::drivers::valve::ValveDriver;
use crate::line::LineId;
use crate::pins;

/// Concrete adapter that combines valve outputs and button inputs.
pub struct HardwareAdapter {
    valves: [ValveDriver; 2],
}

impl HardwareAdapter {
    pub fn new(valve1: ValveDriver, valve2: ValveDriver) -> Self {
        Self {
            valves: [valve1, valve2],
        }
    }
}

// ── ControlInputPort implementation ───────────────────────────

impl ControlInputPort for HardwareAdapter {
    fn valve_request(&mut self, line: LineId) -> ValveRequest {
        let (open_pin, close_pin) = match line {
            LineId::Line1 => (pins::OPEN_BUTTON1_GPIO, pins::CLOSE_BUTTON1_GPIO),
            LineId::Line2 => (pins::OPEN_BUTTON2_GPIO, pins::CLOSE_BUTTON2_GPIO),
        };
        // Active-low wiring: pressed = LOW.
        ValveRequest {
            open: !hw_init::gpio_read(open_pin),
            close: !hw_init::gpio_read(close_pin),
        }
    }
}

// ── ValvePort implementation ──────────────────────────────────

impl ValvePort for HardwareAdapter {
    fn set_valve(&mut self, line: LineId, open: bool) {
        self.valves[line.index()].set_open(open);
    }
}
