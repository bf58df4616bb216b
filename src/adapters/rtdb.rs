//! Firebase Realtime Database telemetry adapter.
//!
//! Implements [`TelemetrySink`] — the remote store the publisher writes
//! volume totals into.  Values land at `<rtdb_url>/<path>.json` via REST
//! PUT, authenticated with the ID token from an anonymous Identity
//! Toolkit sign-up performed once at startup.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real HTTPS calls via `esp_idf_svc::http`.
//! - **all other targets**: in-memory simulation with injectable per-path
//!   failures for tests.
//!
//! `ready()` is the connectivity/auth gate: it holds `false` until the
//! WiFi link is up (pushed in by the loop via [`RtdbClient::set_link_up`])
//! *and* the sign-up succeeded, so the publisher skips cycles instead of
//! burning time on writes that cannot reach the store.

use log::{info, warn};

use crate::app::ports::TelemetrySink;
use crate::config::SystemConfig;
use crate::error::TelemetryError;

#[cfg(target_os = "espidf")]
const SIGNUP_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

pub struct RtdbClient {
    base_url: heapless::String<96>,
    api_key: heapless::String<48>,
    id_token: Option<String>,
    link_up: bool,
    /// Simulation: recorded writes and injectable failure.
    #[cfg(not(target_os = "espidf"))]
    sim_writes: Vec<(String, f32)>,
    #[cfg(not(target_os = "espidf"))]
    sim_fail_path: Option<&'static str>,
}

impl RtdbClient {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            base_url: config.rtdb_url.clone(),
            api_key: config.api_key.clone(),
            id_token: None,
            link_up: false,
            #[cfg(not(target_os = "espidf"))]
            sim_writes: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_fail_path: None,
        }
    }

    /// Update the connectivity half of the `ready()` gate; the loop calls
    /// this every iteration with the WiFi adapter's state.
    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    /// One-time anonymous sign-up.  Non-fatal on failure: the client just
    /// stays not-ready and the loop keeps running (valves before telemetry).
    pub fn sign_up(&mut self) -> Result<(), TelemetryError> {
        if self.base_url.is_empty() || self.api_key.is_empty() {
            warn!("rtdb: no endpoint configured, telemetry disabled");
            return Err(TelemetryError::NotReady);
        }
        match self.platform_sign_up() {
            Ok(token) => {
                info!("rtdb: anonymous sign-up ok");
                self.id_token = Some(token);
                Ok(())
            }
            Err(e) => {
                warn!("rtdb: sign-up failed: {}", e);
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_sign_up(&mut self) -> Result<String, TelemetryError> {
        use esp_idf_svc::embedded_svc::http::client::Client;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::Write as _;

        let conn = EspHttpConnection::new(&Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| TelemetryError::Transport)?;
        let mut client = Client::wrap(conn);

        let url = format!("{}?key={}", SIGNUP_ENDPOINT, self.api_key);
        let body = br#"{"returnSecureToken":true}"#;
        let mut request = client
            .post(&url, &[("Content-Type", "application/json")])
            .map_err(|_| TelemetryError::Transport)?;
        request.write_all(body).map_err(|_| TelemetryError::Transport)?;
        let mut response = request.submit().map_err(|_| TelemetryError::Transport)?;

        let status = response.status();
        if status != 200 {
            return Err(TelemetryError::AuthFailed);
        }

        let mut buf = [0u8; 2048];
        let mut len = 0;
        loop {
            let n = response
                .read(&mut buf[len..])
                .map_err(|_| TelemetryError::Transport)?;
            if n == 0 {
                break;
            }
            len += n;
            if len == buf.len() {
                break;
            }
        }

        let parsed: serde_json::Value =
            serde_json::from_slice(&buf[..len]).map_err(|_| TelemetryError::AuthFailed)?;
        parsed["idToken"]
            .as_str()
            .map(String::from)
            .ok_or(TelemetryError::AuthFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_sign_up(&mut self) -> Result<String, TelemetryError> {
        info!("rtdb(sim): anonymous sign-up");
        Ok(String::from("sim-id-token"))
    }

    #[cfg(target_os = "espidf")]
    fn platform_set(&mut self, path: &str, value: f32) -> Result<(), TelemetryError> {
        use esp_idf_svc::embedded_svc::http::client::Client;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::io::Write as _;

        let token = self.id_token.as_deref().ok_or(TelemetryError::NotReady)?;
        let url = format!("{}/{}.json?auth={}", self.base_url, path, token);
        let body = serde_json::to_vec(&value).map_err(|_| TelemetryError::Transport)?;

        let conn = EspHttpConnection::new(&Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| TelemetryError::Transport)?;
        let mut client = Client::wrap(conn);

        let mut request = client
            .put(&url, &[("Content-Type", "application/json")])
            .map_err(|_| TelemetryError::Transport)?;
        request.write_all(&body).map_err(|_| TelemetryError::Transport)?;
        let response = request.submit().map_err(|_| TelemetryError::Transport)?;

        match response.status() {
            200 => Ok(()),
            401 | 403 => Err(TelemetryError::AuthFailed),
            status => Err(TelemetryError::HttpStatus(status)),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_set(&mut self, path: &str, value: f32) -> Result<(), TelemetryError> {
        if self.sim_fail_path == Some(path) {
            return Err(TelemetryError::Transport);
        }
        self.sim_writes.push((path.to_string(), value));
        Ok(())
    }

    // ── Simulation hooks (host tests) ─────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_writes(&self) -> &[(String, f32)] {
        &self.sim_writes
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_path(&mut self, path: Option<&'static str>) {
        self.sim_fail_path = path;
    }
}

// ───────────────────────────────────────────────────────────────
// TelemetrySink
// ───────────────────────────────────────────────────────────────

impl TelemetrySink for RtdbClient {
    fn ready(&self) -> bool {
        self.link_up && self.id_token.is_some()
    }

    fn set(&mut self, path: &str, value: f32) -> Result<(), TelemetryError> {
        self.platform_set(path, value)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
