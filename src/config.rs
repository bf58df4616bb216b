//! System configuration parameters
//!
//! All tunable parameters for the FarmFlow controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Flow measurement ---
    /// Flow sensor calibration: pulses per litre of water passed.
    /// Applies to both lines (identical sensors).
    pub pulses_per_litre: f32,
    /// Flow sample interval (milliseconds)
    pub flow_sample_interval_ms: u64,

    // --- Display ---
    /// LCD refresh interval (milliseconds)
    pub display_refresh_interval_ms: u64,

    // --- Telemetry ---
    /// Remote publish interval (milliseconds)
    pub telemetry_interval_ms: u64,

    // --- Network ---
    /// WiFi station SSID (empty until provisioned)
    pub wifi_ssid: heapless::String<32>,
    /// WiFi station password
    pub wifi_password: heapless::String<64>,
    /// Firebase Realtime Database base URL
    pub rtdb_url: heapless::String<96>,
    /// Firebase Web API key (anonymous sign-up)
    pub api_key: heapless::String<48>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // YF-S201-class sensors on 3/4" line
            pulses_per_litre: 4.5,
            flow_sample_interval_ms: 1_000,

            display_refresh_interval_ms: 2_000,

            telemetry_interval_ms: 15_000,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
            rtdb_url: heapless::String::new(),
            api_key: heapless::String::new(),
        }
    }
}
