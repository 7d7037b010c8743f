//! Controller driven through [`PinAdapter`] with a simulated microsecond
//! clock, so timer callbacks can arrive late the way the `esp_timer` task
//! delivers them.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use sunalarm::adapters::hardware::{ArmingLedger, PinAdapter, PulseEdge, PulseTimer};
use sunalarm::app::service::Controller;
use sunalarm::config::{DAWN_INTERVAL, DimmerConfig, TIMER_TICK_US};

use crate::mock_hw::RecordingSink;

const HALF_WAVE_TICKS: u32 = 520;
/// 60 Hz half-wave.
const HALF_WAVE_US: u32 = 8_333;

// ── Simulated board ───────────────────────────────────────────

#[derive(Clone, Default)]
struct SharedPin(Rc<Cell<bool>>);

impl ErrorType for SharedPin {
    type Error = Infallible;
}

impl OutputPin for SharedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

impl InputPin for SharedPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

struct SimTimer {
    now_us: Rc<Cell<u32>>,
    ledger: ArmingLedger,
}

impl PulseTimer for SimTimer {
    fn capture(&mut self) -> u32 {
        HALF_WAVE_TICKS
    }

    fn arm(&mut self, on_delay: u32, off_delay: u32) {
        let now = self.now_us.get();
        self.ledger.arm(
            now + on_delay * TIMER_TICK_US,
            now + off_delay * TIMER_TICK_US,
        );
    }

    fn disarm(&mut self) {
        self.ledger.disarm();
    }

    fn claim(&mut self, edge: PulseEdge, fired_at_us: u32) -> bool {
        self.ledger.claim(edge, fired_at_us)
    }
}

type SimBoard = PinAdapter<SharedPin, SharedPin, SharedPin, SimTimer>;

struct Bench {
    ctl: Controller,
    hw: SimBoard,
    sink: RecordingSink,
    now_us: Rc<Cell<u32>>,
    gate: Rc<Cell<bool>>,
    /// Time of the most recent zero crossing.
    edge_us: u32,
}

impl Bench {
    /// Calibrated, in `Normal`, at dawn minute 1 (the dimmest step).
    fn at_first_dawn_step() -> Self {
        let now_us = Rc::new(Cell::new(0));
        let gate = SharedPin::default();
        let gate_level = gate.0.clone();
        // Released: the button reads high through its pull-up.
        let button = SharedPin(Rc::new(Cell::new(true)));
        let timer = SimTimer {
            now_us: now_us.clone(),
            ledger: ArmingLedger::new(),
        };
        let mut hw = PinAdapter::new(gate, SharedPin::default(), button, timer);

        let config = DimmerConfig {
            plugged_in_minute: 1,
            ..DimmerConfig::default()
        };
        let mut ctl = Controller::new(config).expect("valid config");
        let mut sink = RecordingSink::default();
        ctl.start(&mut hw, &mut sink);

        let mut bench = Self {
            ctl,
            hw,
            sink,
            now_us,
            gate: gate_level,
            edge_us: 0,
        };
        for _ in 0..DAWN_INTERVAL {
            bench.zero_cross();
        }
        assert!(bench.ctl.is_calibrated());
        bench
    }

    fn zero_cross(&mut self) {
        self.edge_us += HALF_WAVE_US;
        self.now_us.set(self.edge_us);
        self.ctl.on_zero_cross(&mut self.hw, &mut self.sink);
    }

    /// A timer callback stamped at `fired_at_us`, as `main` wires it.
    fn fire(&mut self, edge: PulseEdge, fired_at_us: u32) {
        if self.hw.claim_fire(edge, fired_at_us) {
            match edge {
                PulseEdge::On => self.ctl.on_pulse_on_fire(&mut self.hw),
                PulseEdge::Off => self.ctl.on_pulse_off_fire(&mut self.hw),
            }
        }
    }
}

fn on_us(edge_us: u32) -> u32 {
    edge_us + HALF_WAVE_TICKS * TIMER_TICK_US
}

fn off_us(edge_us: u32) -> u32 {
    edge_us + (HALF_WAVE_TICKS + 10) * TIMER_TICK_US
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn dimmest_step_releases_gate_after_the_next_zero_cross() {
    let mut bench = Bench::at_first_dawn_step();
    bench.zero_cross();
    assert_eq!(bench.ctl.intensity(), 1);
    let edge = bench.edge_us;
    assert!(off_us(edge) > edge + HALF_WAVE_US);

    bench.fire(PulseEdge::On, on_us(edge));
    assert!(bench.gate.get());
    bench.fire(PulseEdge::Off, off_us(edge));
    assert!(!bench.gate.get());
    assert!(bench.ctl.pending_pulse().is_none());
}

#[test]
fn late_off_fire_from_previous_half_wave_does_not_cancel_the_next_pulse() {
    let mut bench = Bench::at_first_dawn_step();

    // Half-wave A fires, but its off callback is still queued when B arms.
    bench.zero_cross();
    let edge_a = bench.edge_us;
    bench.fire(PulseEdge::On, on_us(edge_a));
    assert!(bench.gate.get());

    bench.zero_cross();
    let edge_b = bench.edge_us;
    assert!(!bench.gate.get());
    let pulse_b = bench.ctl.pending_pulse();
    assert!(pulse_b.is_some());

    // A's off callback runs after B armed, stamped at its own due time.
    bench.fire(PulseEdge::Off, off_us(edge_a));
    assert!(!bench.gate.get());
    assert_eq!(bench.ctl.pending_pulse(), pulse_b);

    bench.fire(PulseEdge::On, on_us(edge_b));
    assert!(bench.gate.get(), "pulse B must still fire");
    bench.fire(PulseEdge::Off, off_us(edge_b));
    assert!(!bench.gate.get());
}

#[test]
fn late_on_fire_from_previous_half_wave_is_dropped() {
    let mut bench = Bench::at_first_dawn_step();
    bench.zero_cross();
    let edge_a = bench.edge_us;
    bench.zero_cross();
    let edge_b = bench.edge_us;

    // A's on callback was dispatched before the re-arm.
    bench.fire(PulseEdge::On, on_us(edge_a));
    assert!(!bench.gate.get());

    bench.fire(PulseEdge::On, on_us(edge_b));
    assert!(bench.gate.get());
}
