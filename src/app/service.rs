//! Dimmer controller: the hexagonal core.
//!
//! [`Controller`] owns every piece of dimmer state: calibration buffer,
//! dawn curve, clock, button recognizer, mode FSM and the outstanding gate
//! pulse.  It exposes the three interrupt entry points and nothing else
//! touches that state.  All I/O flows through port traits injected at call
//! sites, so the whole pipeline is testable with mock adapters.
//!
//! ```text
//!  MainsPort ──▶ ┌──────────────────────────────────┐ ──▶ EventSink
//!                │            Controller            │
//!   GatePort ◀── │ Calib · Clock · Button · FSM ·   │ ──▶ StatusBoard
//!                │ PhaseScheduler                   │
//!                └──────────────────────────────────┘
//! ```
//!
//! Per zero-cross edge:
//!
//! 1. calibration sample (until the curve exists, nothing else runs)
//! 2. clock tick
//! 3. button update
//! 4. mode update / transition
//! 5. intensity → gate action

use log::{debug, info};

use crate::calibration::{Calibrator, DawnCurve, SampleOutcome};
use crate::clock::Clock;
use crate::config::{DimmerConfig, DAWN_INTERVAL};
use crate::drivers::button::ButtonDriver;
use crate::error;
use crate::fsm::context::ModeContext;
use crate::fsm::states::build_mode_table;
use crate::fsm::{Fsm, ModeId};
use crate::scheduler::{PhaseScheduler, ScheduledPulse};

use super::events::DimmerEvent;
use super::ports::{EventSink, GatePort, MainsPort};
use super::status::{StatusBoard, StatusSnapshot};

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    fsm: Fsm,
    ctx: ModeContext,
    calibrator: Calibrator,
    curve: Option<DawnCurve>,
    clock: Clock,
    button: ButtonDriver,
    scheduler: PhaseScheduler,
    /// Indicator level last written to the port (`None` before start).
    indicator: Option<bool>,
    intensity: u16,
    edges: u32,
}

impl Controller {
    /// Validate `config` and build an uncalibrated controller.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    pub fn new(config: DimmerConfig) -> error::Result<Self> {
        config.validate()?;
        let clock = Clock::new(config.cycles_per_minute, config.plugged_in_minute);
        let scheduler = PhaseScheduler::new(config.pulse_width);
        let ctx = ModeContext::new(config);
        let fsm = Fsm::new(build_mode_table(), ModeId::Calibrating);

        Ok(Self {
            fsm,
            ctx,
            calibrator: Calibrator::new(),
            curve: None,
            clock,
            button: ButtonDriver::new(),
            scheduler,
            indicator: None,
            intensity: 0,
            edges: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Calibrating` and put every output in a known state.
    pub fn start(&mut self, hw: &mut impl GatePort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        hw.disarm_pulse();
        hw.gate_set(false);
        self.sync_indicator(hw);
        sink.emit(&DimmerEvent::Started(self.fsm.current_mode()));
        info!(
            "Controller started in {:?} at minute {}",
            self.fsm.current_mode(),
            self.clock.minute()
        );
    }

    // ── Interrupt entry points ────────────────────────────────

    /// Zero-cross edge: run the whole per-edge pipeline.
    ///
    /// `hw` satisfies **both** [`MainsPort`] and [`GatePort`], avoiding a
    /// double mutable borrow of the one adapter.
    pub fn on_zero_cross(
        &mut self,
        hw: &mut (impl MainsPort + GatePort),
        sink: &mut impl EventSink,
    ) {
        self.edges = self.edges.wrapping_add(1);
        let raw_ticks = hw.zero_cross_edge();
        let pressed = hw.button_pressed();

        // 1. Calibration owns the edge until the curve exists.
        if self.curve.is_none() {
            self.calibrate(raw_ticks, hw, sink);
            return;
        }

        // 2. Clock
        let minute_boundary = self.clock.tick();
        self.ctx.minute = self.clock.minute();
        self.ctx.minute_boundary = minute_boundary;

        // 3. Button
        self.ctx.gesture = self.button.update(pressed);
        if let Some(g) = self.ctx.gesture {
            debug!("button released after {} half-cycles", g.duration);
            sink.emit(&DimmerEvent::Gesture {
                duration: g.duration,
            });
        }

        // 4. Mode
        let prev = self.fsm.current_mode();
        self.fsm.tick(&mut self.ctx);
        self.ctx.gesture = None;
        let mode = self.fsm.current_mode();
        if mode != prev {
            sink.emit(&DimmerEvent::ModeChanged { from: prev, to: mode });
        }
        self.sync_indicator(hw);

        // 5. Gate
        self.intensity = self.fsm.intensity(&self.ctx);
        if let Some(curve) = &self.curve {
            self.scheduler.apply(self.intensity, curve, hw);
        }
    }

    /// First gate-timer compare.
    pub fn on_pulse_on_fire(&mut self, hw: &mut impl GatePort) {
        if !self.is_calibrated() {
            debug!("pulse-on fire while calibrating ignored");
            return;
        }
        self.scheduler.on_pulse_on(hw);
    }

    /// Second gate-timer compare.
    pub fn on_pulse_off_fire(&mut self, hw: &mut impl GatePort) {
        if !self.is_calibrated() {
            debug!("pulse-off fire while calibrating ignored");
            return;
        }
        self.scheduler.on_pulse_off(hw);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Copy the externally visible state onto `board`.
    pub fn publish(&self, board: &StatusBoard) {
        board.publish(&self.snapshot());
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            calibrated: self.is_calibrated(),
            mode: self.fsm.current_mode(),
            minute: self.clock.minute(),
            cycle: self.clock.cycle(),
            manual_minutes_left: self.ctx.manual_minutes_left,
            intensity: self.intensity,
            edges: self.edges,
            samples: self.calibration_samples(),
        }
    }

    pub fn mode(&self) -> ModeId {
        self.fsm.current_mode()
    }

    pub fn is_calibrated(&self) -> bool {
        self.curve.is_some()
    }

    /// The dawn curve, once calibration has finished.
    pub fn curve(&self) -> Option<&DawnCurve> {
        self.curve.as_ref()
    }

    pub fn minute(&self) -> u16 {
        self.clock.minute()
    }

    pub fn cycle(&self) -> u16 {
        self.clock.cycle()
    }

    pub fn manual_minutes_left(&self) -> u16 {
        self.ctx.manual_minutes_left
    }

    /// Intensity chosen on the most recent calibrated edge.
    pub fn intensity(&self) -> u16 {
        self.intensity
    }

    pub fn pending_pulse(&self) -> Option<ScheduledPulse> {
        self.scheduler.pending()
    }

    // ── Internal ──────────────────────────────────────────────

    fn calibrate(&mut self, raw_ticks: u32, hw: &mut impl GatePort, sink: &mut impl EventSink) {
        match self.calibrator.push(raw_ticks) {
            SampleOutcome::Rejected => debug!("calibration: invalid capture dropped"),
            SampleOutcome::Accepted { .. } => {}
            SampleOutcome::Complete(curve) => {
                sink.emit(&DimmerEvent::CalibrationComplete {
                    half_wave_ticks: curve.half_wave_ticks(),
                    mains_centihertz: curve.mains_centihertz(),
                });
                self.curve = Some(curve);

                let prev = self.fsm.current_mode();
                self.fsm.force_transition(ModeId::Normal, &mut self.ctx);
                sink.emit(&DimmerEvent::ModeChanged {
                    from: prev,
                    to: self.fsm.current_mode(),
                });
                self.sync_indicator(hw);
            }
        }
    }

    /// Valid samples collected, pinned at `DAWN_INTERVAL` once calibrated.
    fn calibration_samples(&self) -> u16 {
        if self.is_calibrated() {
            DAWN_INTERVAL as u16
        } else {
            self.calibrator.count() as u16
        }
    }

    fn sync_indicator(&mut self, hw: &mut impl GatePort) {
        let want = self.ctx.indicator;
        if self.indicator != Some(want) {
            hw.indicator_set(want);
            self.indicator = Some(want);
        }
    }
}
