//! Task Watchdog Timer (TWDT) driver.
//!
//! The valves must stay operator-responsive, so a stalled control loop is
//! the one fault worth a reset: the loop feeds the TWDT every iteration
//! and the chip reboots if no feed arrives within the timeout.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT reconfigure/add are called once from the main
            // task before the control loop starts.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("watchdog: reconfigure returned {} (may already be set up)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    log::info!("watchdog: subscribed ({}s timeout)", TIMEOUT_MS / 1000);
                } else {
                    log::warn!("watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("watchdog(sim): no-op");
            Self {}
        }
    }

    /// Feed the watchdog; called once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: reset on the subscribed task only.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
