//! Zero-cross interrupt wiring.
//!
//! The GPIO ISR does the minimum: timestamp the edge and wake the
//! zero-cross task.  Everything else (calibration, FSM, logging) runs in
//! that task, never in interrupt context.

use core::num::NonZeroU32;
use core::sync::atomic::{AtomicPtr, AtomicU32, Ordering};

use esp_idf_svc::hal::task;
use esp_idf_svc::sys::*;
use log::info;

use crate::error::{Error, Result};
use crate::pins;

/// Low 32 bits of `esp_timer_get_time()` at the latest edge (µs, wrapping).
static LAST_EDGE_US: AtomicU32 = AtomicU32::new(0);
/// Edges seen by the ISR since boot (wrapping).
static EDGE_COUNT: AtomicU32 = AtomicU32::new(0);
/// Task woken on every edge.
static ZERO_CROSS_TASK: AtomicPtr<core::ffi::c_void> = AtomicPtr::new(core::ptr::null_mut());

const EDGE_NOTIFICATION: NonZeroU32 = NonZeroU32::MIN;

unsafe extern "C" fn zero_cross_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    let now = unsafe { esp_timer_get_time() } as u32;
    LAST_EDGE_US.store(now, Ordering::Release);
    EDGE_COUNT.fetch_add(1, Ordering::Relaxed);

    let task = ZERO_CROSS_TASK.load(Ordering::Acquire);
    if !task.is_null() {
        // SAFETY: the handle was stored by the task itself and that task
        // never exits.  Notification from ISR context is what this call is for.
        let _ = unsafe { task::notify_and_yield(task.cast(), EDGE_NOTIFICATION) };
    }
}

/// Timestamp of the most recent zero-cross edge, µs (wrapping).
pub fn last_edge_us() -> u32 {
    LAST_EDGE_US.load(Ordering::Acquire)
}

/// Edges counted by the ISR, including ones the task coalesced.
pub fn edge_count() -> u32 {
    EDGE_COUNT.load(Ordering::Relaxed)
}

/// Current `esp_timer` time, truncated like [`last_edge_us`].
pub fn now_us() -> u32 {
    // SAFETY: read-only counter access.
    (unsafe { esp_timer_get_time() }) as u32
}

/// Configure the zero-cross input and route its rising edge to `notify`.
///
/// Must be called from the task that will wait for the notifications.
pub fn init_zero_cross_isr(notify: TaskHandle_t) -> Result<()> {
    ZERO_CROSS_TASK.store(notify.cast(), Ordering::Release);

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ZERO_CROSS_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };

    // SAFETY: one-shot boot configuration of a pin nothing else owns.
    // ESP_ERR_INVALID_STATE from the ISR service means it is already
    // installed, which is fine.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as esp_err_t {
            log::error!("zero-cross gpio_config failed (rc={})", ret);
            return Err(Error::Init("zero-cross GPIO config failed"));
        }

        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            log::error!("gpio_install_isr_service failed (rc={})", ret);
            return Err(Error::Init("GPIO ISR service install failed"));
        }

        let ret = gpio_isr_handler_add(
            pins::ZERO_CROSS_GPIO,
            Some(zero_cross_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK as esp_err_t {
            log::error!("zero-cross gpio_isr_handler_add failed (rc={})", ret);
            return Err(Error::Init("zero-cross ISR registration failed"));
        }
        gpio_intr_enable(pins::ZERO_CROSS_GPIO);
    }

    info!("hw_init: zero-cross ISR on GPIO{}", pins::ZERO_CROSS_GPIO);
    Ok(())
}
