//! Phase-delay scheduler.
//!
//! Turns the per-edge light intensity into a gate action for the coming
//! half-wave:
//!
//! ```text
//!   zero cross                     on_delay   off_delay
//!       │                             │ pulse  │
//!  gate ┴─────────────────────────────┬────────┴───────────────  (dimmed)
//!  load ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░████████████████████████  TRIAC latched
//!                                                               until next zero
//! ```
//!
//! | intensity        | action                                      |
//! |------------------|---------------------------------------------|
//! | `0`              | gate off, no pulse                          |
//! | `1..=STEPS`      | gate off, arm pulse at `curve[intensity−1]` |
//! | `> STEPS`        | gate on for the whole half-wave             |

use log::{debug, trace};

use crate::app::ports::GatePort;
use crate::calibration::DawnCurve;
use crate::config::STEPS;

/// One armed gate firing, in timer ticks after the zero crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPulse {
    pub on_delay: u32,
    pub off_delay: u32,
}

/// Gate action chosen for one half-wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    Off,
    Pulse(ScheduledPulse),
    FullOn,
}

impl GateCommand {
    /// Decide the gate action for `intensity` without touching hardware.
    pub fn plan(intensity: u16, curve: &DawnCurve, pulse_width: u32) -> Self {
        let step = intensity as usize;
        if step == 0 {
            return Self::Off;
        }
        if step > STEPS {
            return Self::FullOn;
        }
        match curve.delay(step - 1) {
            Some(on_delay) => Self::Pulse(ScheduledPulse {
                on_delay,
                off_delay: on_delay.saturating_add(pulse_width),
            }),
            None => Self::FullOn,
        }
    }
}

/// Tracks the outstanding pulse between arming and its two timer fires.
pub struct PhaseScheduler {
    pulse_width: u32,
    pending: Option<ScheduledPulse>,
}

impl PhaseScheduler {
    pub const fn new(pulse_width: u32) -> Self {
        Self {
            pulse_width,
            pending: None,
        }
    }

    /// Apply the gate action for the half-wave that just started.
    ///
    /// Arming replaces any outstanding pulse: the port restarts the timer
    /// counter and both compares together.
    pub fn apply(
        &mut self,
        intensity: u16,
        curve: &DawnCurve,
        gate: &mut impl GatePort,
    ) -> GateCommand {
        let cmd = GateCommand::plan(intensity, curve, self.pulse_width);
        match cmd {
            GateCommand::Off => {
                self.pending = None;
                gate.gate_set(false);
            }
            GateCommand::Pulse(pulse) => {
                gate.gate_set(false);
                gate.arm_pulse(pulse.on_delay, pulse.off_delay);
                self.pending = Some(pulse);
                trace!("phase: armed {}..{} ticks", pulse.on_delay, pulse.off_delay);
            }
            GateCommand::FullOn => {
                self.pending = None;
                gate.gate_set(true);
            }
        }
        cmd
    }

    /// First compare: fire the TRIAC.
    pub fn on_pulse_on(&mut self, gate: &mut impl GatePort) {
        if self.pending.is_some() {
            gate.gate_set(true);
        } else {
            debug!("phase: stale pulse-on fire ignored");
        }
    }

    /// Second compare: stop the timer and release the gate.  The TRIAC
    /// stays latched until the zero crossing; holding the gate longer would
    /// carry it into the next half-wave.
    pub fn on_pulse_off(&mut self, gate: &mut impl GatePort) {
        gate.disarm_pulse();
        if self.pending.take().is_some() {
            gate.gate_set(false);
        }
    }

    /// The pulse armed for the current half-wave, if it has not finished.
    pub fn pending(&self) -> Option<ScheduledPulse> {
        self.pending
    }
}
