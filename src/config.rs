//! System configuration parameters
//!
//! The dawn geometry (`DAWN_MIN`, `STEPS`) is fixed at build time because it
//! sizes the calibration buffer and the dawn curve.  Everything the control
//! core consults per edge lives in [`DimmerConfig`], whose defaults are the
//! compile-time constants below.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// --- Alarm geometry ---

/// Hour of day at which the lamp should reach full brightness.
pub const WAKEUP: u16 = 6;
/// Dawn duration in minutes.
pub const DAWN_MIN: usize = 8;
/// Dawn resolution (steps per minute).
pub const STEPS: usize = 8;
/// Number of calibration samples and dawn curve entries.
pub const DAWN_INTERVAL: usize = (DAWN_MIN + 1) * STEPS - 1;

// --- Mains timebase ---

/// AC half-cycles per minute (60 Hz mains).
pub const CYCLES_PER_MINUTE: u16 = 7200;
/// Minutes per simulated day.
pub const MINUTES_PER_DAY: u16 = 1440;
/// Capture timer resolution: 16 µs per tick (520 ticks per 60 Hz half-wave).
pub const TIMER_TICK_US: u32 = 16;

// --- Gate drive ---

/// Gate pulse width in timer ticks.  Long enough to latch the TRIAC,
/// short enough to release well before the next zero crossing.
pub const FIXED_PULSE_WIDTH: u32 = 10;

// --- Button ---

/// Hold length (half-cycles, ≈1 s) separating a short from a long press.
pub const GESTURE_THRESHOLD: u16 = 120;
/// Half-cycles of hold per minute of manual-on time.
pub const MANUAL_TICKS_PER_MINUTE: u16 = 4;

// --- Sleep-in ---

/// Sleep-in shifts the dawn start by this many minutes.
pub const SLEEP_IN_OFFSET_MIN: u16 = 60;
/// Minute at which sleep-in is cancelled regardless of button activity.
pub const SLEEP_IN_CEILING_MIN: u16 = 300;

// --- Power-up ---

/// Hour of day the device is assumed to be plugged in at (10 PM).
pub const PLUGGED_IN_HOUR: u16 = 22;

/// Internal day minute corresponding to a wall-clock `hour`.
///
/// Minute 0 of the internal day is the start of dawn, `DAWN_MIN` minutes
/// before `WAKEUP`.
pub const fn plugged_in_minute(hour: u16) -> u16 {
    let minutes = (hour as i32 - WAKEUP as i32) * 60 + DAWN_MIN as i32;
    minutes.rem_euclid(MINUTES_PER_DAY as i32) as u16
}

/// Runtime control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimmerConfig {
    // --- Clock ---
    /// Internal day minute the clock starts at on power-up.
    pub plugged_in_minute: u16,
    /// Half-cycles per minute; depends on the mains frequency.
    pub cycles_per_minute: u16,

    // --- Button ---
    /// Short/long press boundary in half-cycles.
    pub gesture_threshold: u16,
    /// Hold half-cycles per manual-on minute.
    pub manual_ticks_per_minute: u16,

    // --- Sleep-in ---
    /// Dawn delay applied while sleeping in (minutes).
    pub sleep_in_offset_minutes: u16,
    /// Minute at which sleep-in is forcibly ended.
    pub sleep_in_ceiling_minute: u16,

    // --- Gate ---
    /// Gate pulse width in timer ticks.
    pub pulse_width: u32,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            plugged_in_minute: plugged_in_minute(PLUGGED_IN_HOUR),
            cycles_per_minute: CYCLES_PER_MINUTE,

            gesture_threshold: GESTURE_THRESHOLD,
            manual_ticks_per_minute: MANUAL_TICKS_PER_MINUTE,

            sleep_in_offset_minutes: SLEEP_IN_OFFSET_MIN,
            sleep_in_ceiling_minute: SLEEP_IN_CEILING_MIN,

            pulse_width: FIXED_PULSE_WIDTH,
        }
    }
}

impl DimmerConfig {
    /// Reject values the control core cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycles_per_minute == 0 {
            return Err(ConfigError::ValidationFailed("cycles_per_minute must be > 0"));
        }
        if (self.cycles_per_minute as usize) < STEPS {
            return Err(ConfigError::ValidationFailed(
                "cycles_per_minute must be >= STEPS",
            ));
        }
        if self.gesture_threshold == 0 {
            return Err(ConfigError::ValidationFailed("gesture_threshold must be > 0"));
        }
        if self.manual_ticks_per_minute == 0 {
            return Err(ConfigError::ValidationFailed(
                "manual_ticks_per_minute must be > 0",
            ));
        }
        if self.pulse_width == 0 {
            return Err(ConfigError::ValidationFailed("pulse_width must be > 0"));
        }
        if self.plugged_in_minute >= MINUTES_PER_DAY {
            return Err(ConfigError::ValidationFailed(
                "plugged_in_minute must be < 1440",
            ));
        }
        if self.sleep_in_ceiling_minute >= MINUTES_PER_DAY {
            return Err(ConfigError::ValidationFailed(
                "sleep_in_ceiling_minute must be < 1440",
            ));
        }
        Ok(())
    }
}
