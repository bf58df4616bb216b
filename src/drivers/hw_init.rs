//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions and registers the flow-sensor interrupt
//! handlers using raw ESP-IDF sys calls.  Called once from `main()`
//! before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // Flow sensors: plain inputs, edge interrupts attached later.
    for &pin in &[pins::FLOW1_PULSE_GPIO, pins::FLOW2_PULSE_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    // Operator buttons: active-low with internal pull-up, level-polled
    // (no interrupts — the loop reads them every iteration).
    let button_pins = [
        pins::OPEN_BUTTON1_GPIO,
        pins::CLOSE_BUTTON1_GPIO,
        pins::OPEN_BUTTON2_GPIO,
        pins::CLOSE_BUTTON2_GPIO,
    ];
    for &pin in &button_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

/// Simulation: all inputs idle HIGH (buttons released on pulled-up wiring).
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::VALVE1_GPIO,
        pins::VALVE2_GPIO,
        pins::LCD_CS_GPIO,
        pins::LCD_WR_GPIO,
        pins::LCD_DATA_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    // Valves start closed (already LOW); the HT1621 bus idles with CS/WR high.
    unsafe {
        gpio_set_level(pins::LCD_CS_GPIO, 1);
        gpio_set_level(pins::LCD_WR_GPIO, 1);
    }

    info!("hw_init: GPIO outputs configured (valves closed)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Microsecond busy-wait (HT1621 bus timing) ─────────────────

#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    esp_idf_hal::delay::Ets::delay_us(us);
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

// ── embedded-hal bridge ───────────────────────────────────────

/// Adapter from a raw GPIO number to the `embedded-hal` [`OutputPin`]
/// trait, so generic drivers (the HT1621) stay platform-agnostic.
///
/// [`OutputPin`]: embedded_hal::digital::OutputPin
pub struct SysOutputPin {
    pin: i32,
}

impl SysOutputPin {
    /// The pin must already be configured as an output by
    /// [`init_peripherals`].
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl embedded_hal::digital::ErrorType for SysOutputPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SysOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, true);
        Ok(())
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::line::LineId;
#[cfg(target_os = "espidf")]
use crate::sensors::flow::pulse_isr;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn flow1_gpio_isr(_arg: *mut core::ffi::c_void) {
    pulse_isr(LineId::Line1);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn flow2_gpio_isr(_arg: *mut core::ffi::c_void) {
    pulse_isr(LineId::Line2);
}

/// Install the per-pin GPIO ISR service and register the flow-sensor
/// rising-edge handlers.  Call after init_peripherals() and before the
/// control loop.  Each handler masks nothing and stays registered for
/// the process lifetime — sampling uses an atomic swap, not detach.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). ISR handlers registered
    // below are static functions that only touch the per-line atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::FLOW1_PULSE_GPIO, gpio_int_type_t_GPIO_INTR_POSEDGE);
        gpio_isr_handler_add(
            pins::FLOW1_PULSE_GPIO,
            Some(flow1_gpio_isr),
            core::ptr::null_mut(),
        );
        gpio_intr_enable(pins::FLOW1_PULSE_GPIO);

        gpio_set_intr_type(pins::FLOW2_PULSE_GPIO, gpio_int_type_t_GPIO_INTR_POSEDGE);
        gpio_isr_handler_add(
            pins::FLOW2_PULSE_GPIO,
            Some(flow2_gpio_isr),
            core::ptr::null_mut(),
        );
        gpio_intr_enable(pins::FLOW2_PULSE_GPIO);

        info!("hw_init: ISR service installed (flow1, flow2 rising edge)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
