//! GPIO pin assignments for the FarmFlow controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Flow sensors (YF-S201 hall-effect, pulse output)
// ---------------------------------------------------------------------------

/// Line 1 flow sensor — rising-edge interrupt source.
pub const FLOW1_PULSE_GPIO: i32 = 4;
/// Line 2 flow sensor — rising-edge interrupt source.
pub const FLOW2_PULSE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Ball valves (motorised, relay-driven)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = valve 1 open, LOW = closed.
pub const VALVE1_GPIO: i32 = 25;
/// Digital output: HIGH = valve 2 open, LOW = closed.
pub const VALVE2_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Operator push buttons (momentary, active-low with pull-up)
// ---------------------------------------------------------------------------

pub const OPEN_BUTTON1_GPIO: i32 = 6;
pub const CLOSE_BUTTON1_GPIO: i32 = 7;
pub const OPEN_BUTTON2_GPIO: i32 = 8;
pub const CLOSE_BUTTON2_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// HT1621 segment LCD (3-wire serial)
// ---------------------------------------------------------------------------

pub const LCD_CS_GPIO: i32 = 12;
pub const LCD_WR_GPIO: i32 = 14;
pub const LCD_DATA_GPIO: i32 = 32;
