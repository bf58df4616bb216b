//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, LCD, the RTDB client, NVS) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::control::valve::ValveRequest;
use crate::error::TelemetryError;
use crate::line::LineId;

// ───────────────────────────────────────────────────────────────
// Control input port (driven adapter: buttons → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain reads the operator's valve request levels.
///
/// Implementations normalize the active-low wiring — `open`/`close` are
/// `true` while the corresponding button is physically pressed.
pub trait ControlInputPort {
    fn valve_request(&mut self, line: LineId) -> ValveRequest;
}

// ───────────────────────────────────────────────────────────────
// Valve actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain commands a valve output.
/// `open = true` drives the output HIGH.
pub trait ValvePort {
    fn set_valve(&mut self, line: LineId, open: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → local readout)
// ───────────────────────────────────────────────────────────────

/// The local volume readout.  `show` accepts a pre-formatted line
/// (channel label + volume with one decimal + unit suffix).
pub trait DisplayPort {
    fn clear(&mut self);
    fn show(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink port (driven adapter: domain → remote store)
// ───────────────────────────────────────────────────────────────

/// The remote volume store, addressed by a two-segment logical path.
///
/// `ready` gates publishing: until connectivity and the auth session are
/// both up it returns `false` and the publisher skips the cycle without
/// consuming its window.  `set` failures are per-channel and carry the
/// reason; they must never panic or block beyond the transport's own
/// timeout.
pub trait TelemetrySink {
    fn ready(&self) -> bool;
    fn set(&mut self, path: &str, value: f32) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / forwarding)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// network forwarder, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
