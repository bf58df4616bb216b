//! FarmFlow Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    Ht1621       RtdbClient     NvsAdapter     │
//! │  (Input+ValvePort)  (Display)    (TelemetrySink)(ConfigPort)   │
//! │  WifiAdapter        LogEventSink Esp32TimeAdapter              │
//! │  (Connectivity)     (EventSink)  (monotonic clock)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  valves · flow integration · telemetry cadence         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use farmflow::adapters::hardware::HardwareAdapter;
use farmflow::adapters::log_sink::LogEventSink;
use farmflow::adapters::nvs::NvsAdapter;
use farmflow::adapters::rtdb::RtdbClient;
use farmflow::adapters::time::Esp32TimeAdapter;
use farmflow::adapters::wifi::{ConnectivityPort, WifiAdapter};
use farmflow::app::ports::ConfigPort;
use farmflow::app::service::AppService;
use farmflow::config::SystemConfig;
use farmflow::drivers::display::Ht1621;
use farmflow::drivers::hw_init::{self, SysOutputPin};
use farmflow::drivers::valve::ValveDriver;
use farmflow::drivers::watchdog::Watchdog;
use farmflow::line::LineId;
use farmflow::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("FarmFlow v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {} — continuing without flow counting", e);
    }
    let watchdog = Watchdog::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                SystemConfig::default()
            }
        },
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. Local display ──────────────────────────────────────
    let mut display = Ht1621::new(
        SysOutputPin::new(pins::LCD_CS_GPIO),
        SysOutputPin::new(pins::LCD_WR_GPIO),
        SysOutputPin::new(pins::LCD_DATA_GPIO),
    );
    display.begin();

    // ── 5. Valve hardware ─────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        ValveDriver::new(LineId::Line1),
        ValveDriver::new(LineId::Line2),
    );

    // ── 6. Network bring-up (the one blocking phase) ──────────
    let mut wifi = WifiAdapter::new();
    if config.wifi_ssid.is_empty() {
        warn!("No WiFi credentials provisioned — telemetry disabled");
    } else {
        match wifi.set_credentials(&config.wifi_ssid, &config.wifi_password) {
            Ok(()) => {
                if let Err(e) = wifi.connect() {
                    warn!("WiFi connect failed ({}), will retry in loop", e);
                }
            }
            Err(e) => warn!("Bad stored WiFi credentials: {}", e),
        }
    }

    let mut rtdb = RtdbClient::new(&config);
    rtdb.set_link_up(wifi.is_connected());
    if wifi.is_connected() && rtdb.sign_up().is_err() {
        warn!("RTDB sign-up failed — telemetry stays disabled this boot");
    }

    // ── 7. Control loop core ──────────────────────────────────
    let time = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&config);
    app.start(time.uptime_ms(), &mut sink);

    info!("System ready. Entering control loop.");

    loop {
        // No blocking inside the loop body: the cadences gate the real
        // work and the buttons get polled at full iteration rate.  On
        // simulation targets, approximate the hardware pacing with sleep.
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(10));

        let now_ms = time.uptime_ms();
        app.tick(now_ms, &mut hw, &mut display, &mut rtdb, &mut sink);

        // WiFi reconnection poll (exponential backoff) and the
        // connectivity half of the telemetry ready() gate.
        wifi.poll();
        rtdb.set_link_up(wifi.is_connected());

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
