//! Shared mutable context threaded through every mode handler.
//!
//! The controller refreshes the clock fields and the completed gesture
//! before each FSM tick; handlers write the override countdown and the
//! indicator request back.

use crate::config::DimmerConfig;
use crate::drivers::button::Gesture;

pub struct ModeContext {
    // -- Clock (refreshed every edge) --
    /// Minute of the internal day.
    pub minute: u16,
    /// The cycle counter wrapped on this edge.
    pub minute_boundary: bool,

    // -- Input --
    /// Gesture completed on this edge, if any.
    pub gesture: Option<Gesture>,

    // -- Mode payload --
    /// Remaining forced-on minutes while in `ManualOn`.
    pub manual_minutes_left: u16,

    // -- Outputs --
    /// Requested indicator LED state.
    pub indicator: bool,

    // -- Configuration --
    pub config: DimmerConfig,
}

impl ModeContext {
    pub fn new(config: DimmerConfig) -> Self {
        Self {
            minute: config.plugged_in_minute,
            minute_boundary: false,
            gesture: None,
            manual_minutes_left: 0,
            indicator: false,
            config,
        }
    }
}
