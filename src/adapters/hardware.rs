//! Hardware adapter: bridges GPIO pins and the gate timer to the domain
//! port traits.
//!
//! [`PinAdapter`] is written against the `embedded-hal` 1.0 digital
//! traits plus a small [`PulseTimer`] trait, so the same adapter drives
//! ESP-IDF `PinDriver`s on the board and plain mock pins on the host.
//! This is the only module that turns port calls into pin writes.
//!
//! Pin errors never reach the core: they are logged and the pin keeps
//! its last level.

use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::{debug, warn};

use crate::app::ports::{GatePort, MainsPort};

// ───────────────────────────────────────────────────────────────
// Pulse timer
// ───────────────────────────────────────────────────────────────

/// Which of the two pulse compares fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseEdge {
    On,
    Off,
}

/// Free-running tick counter with two one-shot compares, in
/// [`TIMER_TICK_US`](crate::config::TIMER_TICK_US) ticks.
pub trait PulseTimer {
    /// Ticks since the previous capture, restarting the count.
    /// `0` when no valid interval is available.
    fn capture(&mut self) -> u32;

    /// Restart the counter and arm both compares together.
    fn arm(&mut self, on_delay: u32, off_delay: u32);

    /// Cancel both compares.
    fn disarm(&mut self);

    /// Accept a compare callback dispatched at `fired_at_us`, consuming it.
    /// `false` for fires of an earlier arming or of a cancelled compare.
    fn claim(&mut self, edge: PulseEdge, fired_at_us: u32) -> bool;
}

/// Due times of the current arming, for timers whose callbacks can be
/// dispatched before a cancel and delivered after the next arm.
///
/// A compare never fires before its due time, so a callback stamped
/// earlier than the current due time belongs to a previous arming.
/// Times are wrapping `u32` microseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArmingLedger {
    on_due_us: Option<u32>,
    off_due_us: Option<u32>,
}

impl ArmingLedger {
    pub const fn new() -> Self {
        Self {
            on_due_us: None,
            off_due_us: None,
        }
    }

    /// Replace both due times; fires of the previous arming stop counting.
    pub fn arm(&mut self, on_due_us: u32, off_due_us: u32) {
        self.on_due_us = Some(on_due_us);
        self.off_due_us = Some(off_due_us);
    }

    pub fn disarm(&mut self) {
        self.on_due_us = None;
        self.off_due_us = None;
    }

    pub fn claim(&mut self, edge: PulseEdge, fired_at_us: u32) -> bool {
        let slot = match edge {
            PulseEdge::On => &mut self.on_due_us,
            PulseEdge::Off => &mut self.off_due_us,
        };
        match *slot {
            Some(due) if fired_at_us.wrapping_sub(due) as i32 >= 0 => {
                *slot = None;
                true
            }
            _ => false,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Pin adapter
// ───────────────────────────────────────────────────────────────

/// Concrete adapter combining gate, indicator, button and pulse timer.
pub struct PinAdapter<G, L, B, T> {
    gate: G,
    indicator: L,
    button: B,
    timer: T,
}

impl<G, L, B, T> PinAdapter<G, L, B, T>
where
    G: OutputPin,
    L: OutputPin,
    B: InputPin,
    T: PulseTimer,
{
    /// Button wired to ground with a pull-up (pressed = low).
    pub fn new(gate: G, indicator: L, button: B, timer: T) -> Self {
        Self {
            gate,
            indicator,
            button,
            timer,
        }
    }

    /// Gate a pulse timer callback: only fires of the current arming may
    /// reach the controller.
    pub fn claim_fire(&mut self, edge: PulseEdge, fired_at_us: u32) -> bool {
        let current = self.timer.claim(edge, fired_at_us);
        if !current {
            debug!("dropped stale {:?} fire at {} us", edge, fired_at_us);
        }
        current
    }
}

// ── MainsPort implementation ──────────────────────────────────

impl<G, L, B, T> MainsPort for PinAdapter<G, L, B, T>
where
    G: OutputPin,
    L: OutputPin,
    B: InputPin,
    T: PulseTimer,
{
    fn zero_cross_edge(&mut self) -> u32 {
        self.timer.capture()
    }

    fn button_pressed(&mut self) -> bool {
        self.button.is_low().unwrap_or_else(|e| {
            warn!("button read failed: {:?}", e.kind());
            false
        })
    }
}

// ── GatePort implementation ───────────────────────────────────

impl<G, L, B, T> GatePort for PinAdapter<G, L, B, T>
where
    G: OutputPin,
    L: OutputPin,
    B: InputPin,
    T: PulseTimer,
{
    fn gate_set(&mut self, on: bool) {
        if let Err(e) = self.gate.set_state(PinState::from(on)) {
            warn!("gate write failed: {:?}", e.kind());
        }
    }

    fn arm_pulse(&mut self, on_delay: u32, off_delay: u32) {
        self.timer.arm(on_delay, off_delay);
    }

    fn disarm_pulse(&mut self) {
        self.timer.disarm();
    }

    fn indicator_set(&mut self, on: bool) {
        if let Err(e) = self.indicator.set_state(PinState::from(on)) {
            warn!("indicator write failed: {:?}", e.kind());
        }
    }
}
