//! Outbound controller events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, queue for the main
//! loop, count in a test.

use crate::fsm::ModeId;

/// Structured events emitted by the dimmer core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimmerEvent {
    /// The controller has started (carries the initial mode).
    Started(ModeId),

    /// The dawn curve is ready; the gate may be driven from now on.
    CalibrationComplete {
        /// Median zero-cross interval in timer ticks.
        half_wave_ticks: u32,
        /// Estimated mains frequency, Hz × 100.
        mains_centihertz: u32,
    },

    /// The mode changed between two edges.
    ModeChanged { from: ModeId, to: ModeId },

    /// A button press was released after `duration` half-cycles.
    Gesture { duration: u16 },
}
