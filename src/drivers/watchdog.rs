//! Main-loop watchdog.
//!
//! The zero-cross thread keeps the lamp running even if the main loop hangs,
//! so a stuck event drain would only show up as a silent log. Subscribing the
//! main task to the ESP-IDF task watchdog turns that into a reset.
//!
//! Off target the watchdog only remembers its timeout.

use log::{info, warn};

use crate::error::{Error, Result};

/// Stall budget for the main loop. The loop sleeps 100 ms per pass.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    timeout_ms: u32,
    armed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(WATCHDOG_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Subscribe the calling task. Failure leaves an unarmed watchdog whose
    /// `feed` does nothing.
    pub fn new(timeout_ms: u32) -> Self {
        let armed = match subscribe_current_task(timeout_ms) {
            Ok(()) => {
                info!("WDT | main task subscribed, {} ms", timeout_ms);
                true
            }
            Err(e) => {
                warn!("WDT | not armed: {}", e);
                false
            }
        };
        Self { timeout_ms, armed }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Call at least once per `timeout_ms`.
    pub fn feed(&self) {
        if self.armed {
            reset_current_task();
        }
    }
}

#[cfg(feature = "espidf")]
fn subscribe_current_task(timeout_ms: u32) -> Result<()> {
    use esp_idf_svc::sys::{
        ESP_ERR_INVALID_STATE, ESP_OK, esp_err_t, esp_task_wdt_add, esp_task_wdt_config_t,
        esp_task_wdt_reconfigure,
    };

    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: FFI on the global TWDT config and the calling task's own entry.
    let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
    // INVALID_STATE: TWDT disabled in sdkconfig; the subscribe below reports it.
    if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
        return Err(Error::Init("task watchdog reconfigure"));
    }
    // SAFETY: null subscribes the calling task.
    if unsafe { esp_task_wdt_add(core::ptr::null_mut()) } != ESP_OK as esp_err_t {
        return Err(Error::Init("task watchdog subscribe"));
    }
    Ok(())
}

#[cfg(feature = "espidf")]
fn reset_current_task() {
    // SAFETY: resets the calling task's own TWDT entry.
    unsafe {
        esp_idf_svc::sys::esp_task_wdt_reset();
    }
}

#[cfg(not(feature = "espidf"))]
fn subscribe_current_task(_timeout_ms: u32) -> Result<()> {
    Ok(())
}

#[cfg(not(feature = "espidf"))]
fn reset_current_task() {}
