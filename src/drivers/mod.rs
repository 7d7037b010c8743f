//! Input recognizers, board drivers and hardware initialisation.

pub mod button;
pub mod watchdog;

#[cfg(feature = "espidf")]
pub mod esp_timer;
#[cfg(feature = "espidf")]
pub mod hw_init;
