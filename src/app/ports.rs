//! Port traits: the boundary between the dimmer core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! The core never touches registers.  A hardware adapter implements
//! [`MainsPort`] and [`GatePort`]; the [`Controller`](super::service::Controller)
//! consumes them via generics, so the whole control pipeline runs on the
//! host against recording mocks.
//!
//! ## Timing contract
//!
//! - Every method is called from interrupt context and must not block.
//! - `arm_pulse` must restart the timer counter and both compares as one
//!   operation, so a compare left over from the previous half-wave cannot
//!   fire inside the new window.

// ───────────────────────────────────────────────────────────────
// Mains port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port, sampled once per zero-cross edge.
pub trait MainsPort {
    /// Timer ticks elapsed since the previous zero-cross edge; restarts
    /// the capture.  `0` marks an invalid capture.
    fn zero_cross_edge(&mut self) -> u32;

    /// Instantaneous button level (`true` = pressed).
    fn button_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Gate port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: TRIAC gate, gate pulse timer and indicator LED.
pub trait GatePort {
    /// Drive the TRIAC gate immediately.
    fn gate_set(&mut self, on: bool);

    /// Restart the pulse timer at zero and arm both compares.
    fn arm_pulse(&mut self, on_delay: u32, off_delay: u32);

    /// Stop the pulse timer; no further compare fires this half-wave.
    fn disarm_pulse(&mut self);

    /// Drive the status LED.
    fn indicator_set(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`DimmerEvent`](super::events::DimmerEvent)s
/// through this port.  Called from interrupt context: implementations must
/// not block (queue, don't print).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DimmerEvent);
}
