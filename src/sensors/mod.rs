//! Sensor subsystem — interrupt-driven flow measurement.
//!
//! One [`FlowMeter`](flow::FlowMeter) per irrigation line; the GPIO ISR
//! increments a per-line atomic pulse counter and the control loop samples
//! it at the flow cadence.

pub mod flow;
