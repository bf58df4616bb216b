//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                |
//! |------------|-------------------|----------------------------|
//! | `hardware` | ControlInputPort  | ESP32 GPIO (buttons)       |
//! |            | ValvePort         | ESP32 GPIO (valve relays)  |
//! | `log_sink` | EventSink         | Serial log output          |
//! | `nvs`      | ConfigPort        | NVS / in-memory store      |
//! | `rtdb`     | TelemetrySink     | Firebase Realtime Database |
//! | `time`     | —                 | ESP32 system timer         |
//! | `wifi`     | ConnectivityPort  | ESP-IDF WiFi STA           |
//!
//! (The HT1621 driver implements `DisplayPort` directly — it is generic
//! over `embedded-hal` pins and needs no further adaptation.)

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod rtdb;
pub mod time;
pub mod wifi;
