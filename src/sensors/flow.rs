//! YF-S201 hall-effect water flow sensors, one per irrigation line.
//!
//! Each sensor outputs one pulse per fixed quantum of water.  An ISR
//! increments the line's atomic counter on each rising edge; the
//! [`FlowMeter::sample`] method swaps it back to zero to compute flow rate
//! and integrate volume.
//!
//! Because the ISR and the main loop run at different priorities, the
//! counter is an `AtomicU32` — lock-free, so sampling never masks the
//! interrupt and no edge can be lost across the read-and-reset boundary.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::line::LineId;

/// Per-line pulse counters incremented by the GPIO ISR.
/// `static` because ISR callbacks in ESP-IDF cannot capture closures.
static LINE1_PULSES: AtomicU32 = AtomicU32::new(0);
static LINE2_PULSES: AtomicU32 = AtomicU32::new(0);

/// The ISR-shared counter for a line.
pub fn pulse_counter(line: LineId) -> &'static AtomicU32 {
    match line {
        LineId::Line1 => &LINE1_PULSES,
        LineId::Line2 => &LINE2_PULSES,
    }
}

/// Called from the GPIO ISR on each rising edge of `line`'s sensor.
/// A pure counter increment — bounded, minimal time, no other effect.
pub fn pulse_isr(line: LineId) {
    pulse_counter(line).fetch_add(1, Ordering::Relaxed);
}

/// Result of one flow sample.
#[derive(Debug, Clone, Copy)]
pub struct FlowSample {
    /// Pulses consumed from the counter for this interval.
    pub pulses: u32,
    /// Instantaneous flow rate (L/min).  Noisy at very short intervals;
    /// display-only, not used for accumulation.
    pub flow_l_per_min: f32,
    /// Volume added to the running total by this sample (ml).
    pub volume_delta_ml: f32,
}

/// Flow integrator for one line.
///
/// Owns the line's calibration and accumulated volume; borrows the
/// `'static` pulse counter shared with the ISR.
pub struct FlowMeter {
    counter: &'static AtomicU32,
    /// Calibration: pulses per litre of water passed.
    pulses_per_litre: f32,
    last_sample_ms: u64,
    total_ml: f32,
    last_flow_l_per_min: f32,
}

impl FlowMeter {
    pub fn new(counter: &'static AtomicU32, pulses_per_litre: f32) -> Self {
        Self {
            counter,
            pulses_per_litre,
            last_sample_ms: 0,
            total_ml: 0.0,
            last_flow_l_per_min: 0.0,
        }
    }

    /// Re-anchor the sample clock, e.g. once at loop start.  Pulses that
    /// arrived before the anchor still count toward the next sample.
    pub fn anchor(&mut self, now_ms: u64) {
        self.last_sample_ms = now_ms;
    }

    /// Consume the pulse counter and integrate volume.
    ///
    /// Returns `None` without touching the counter when no time has elapsed
    /// since the previous sample (double-sampling within one tick, or a
    /// non-monotonic clock) — the pending pulses roll into the next sample.
    pub fn sample(&mut self, now_ms: u64) -> Option<FlowSample> {
        if now_ms <= self.last_sample_ms {
            return None;
        }
        let elapsed_ms = now_ms - self.last_sample_ms;

        // Atomically swap the counter to zero and read the old value.
        // Increments racing the swap land on the zeroed counter and are
        // consumed by the next sample — none lost, none double-counted.
        let pulses = self.counter.swap(0, Ordering::Relaxed);

        let flow_l_per_min =
            (1000.0 / elapsed_ms as f32 * pulses as f32) / self.pulses_per_litre;
        let volume_delta_ml = (flow_l_per_min / 60.0) * 1000.0;

        self.total_ml += volume_delta_ml;
        self.last_sample_ms = now_ms;
        self.last_flow_l_per_min = flow_l_per_min;

        Some(FlowSample {
            pulses,
            flow_l_per_min,
            volume_delta_ml,
        })
    }

    /// Accumulated volume since boot (ml).  Monotonically non-decreasing.
    pub fn total_ml(&self) -> f32 {
        self.total_ml
    }

    /// Rate computed by the most recent sample (L/min).
    pub fn flow_l_per_min(&self) -> f32 {
        self.last_flow_l_per_min
    }
}
