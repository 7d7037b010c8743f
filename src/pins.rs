//! GPIO pin assignments for the Sunalarm dimmer board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Mains interface (opto-isolated)
// ---------------------------------------------------------------------------

/// Zero-cross detector output.  One rising edge per mains half-wave.
pub const ZERO_CROSS_GPIO: i32 = 4;

/// TRIAC gate drive via opto-triac (active HIGH).
pub const GATE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User interface
// ---------------------------------------------------------------------------

/// Momentary push-button to ground, internal pull-up (active LOW).
pub const BUTTON_GPIO: i32 = 6;

/// Status LED (active HIGH): lit once calibrated, dark during sleep-in.
pub const INDICATOR_GPIO: i32 = 7;
