//! End-to-end controller scenarios against [`MockHardware`].

use sunalarm::app::events::DimmerEvent;
use sunalarm::app::service::Controller;
use sunalarm::app::status::StatusBoard;
use sunalarm::config::{DAWN_INTERVAL, DimmerConfig, STEPS};
use sunalarm::fsm::ModeId;

use crate::mock_hw::{HwCall, MockHardware, RecordingSink};

const HALF_WAVE: u32 = 520;

// ── Helpers ───────────────────────────────────────────────────

struct Rig {
    ctl: Controller,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: DimmerConfig) -> Self {
        let mut ctl = Controller::new(config).expect("valid config");
        let mut hw = MockHardware::new(HALF_WAVE);
        let mut sink = RecordingSink::default();
        ctl.start(&mut hw, &mut sink);
        Self { ctl, hw, sink }
    }

    /// Started and fed exactly enough valid edges to finish calibration.
    fn calibrated(config: DimmerConfig) -> Self {
        let mut rig = Self::new(config);
        rig.edges(DAWN_INTERVAL);
        assert!(rig.ctl.is_calibrated());
        rig
    }

    fn edge(&mut self) {
        self.ctl.on_zero_cross(&mut self.hw, &mut self.sink);
    }

    fn edges(&mut self, n: usize) {
        for _ in 0..n {
            self.edge();
        }
    }

    /// Hold for `duration` counted half-cycles, then release.
    fn gesture(&mut self, duration: u16) {
        self.hw.button = true;
        self.edges(duration as usize + 1);
        self.hw.button = false;
        self.edge();
    }

    fn run_until_minute(&mut self, minute: u16) {
        let mut guard = 0u32;
        while self.ctl.minute() != minute {
            self.edge();
            guard += 1;
            assert!(guard < 1_000_000, "minute {minute} never reached");
        }
    }
}

/// Ten half-cycles per minute so scenarios cross many minutes quickly.
fn fast_clock(plugged_in_minute: u16) -> DimmerConfig {
    DimmerConfig {
        cycles_per_minute: 10,
        plugged_in_minute,
        ..DimmerConfig::default()
    }
}

// ── Calibration ───────────────────────────────────────────────

#[test]
fn calibration_completes_after_exactly_dawn_interval_valid_samples() {
    let mut rig = Rig::new(DimmerConfig::default());
    rig.hw.scripted.extend([0, 0, HALF_WAVE, 0]);

    // 4 scripted edges hold one valid sample.
    rig.edges(4 + DAWN_INTERVAL - 2);
    assert!(!rig.ctl.is_calibrated());
    assert_eq!(rig.ctl.snapshot().samples as usize, DAWN_INTERVAL - 1);

    rig.edge();
    assert!(rig.ctl.is_calibrated());
    assert_eq!(rig.ctl.mode(), ModeId::Normal);

    let curve = rig.ctl.curve().expect("curve");
    let d = curve.as_slice();
    assert_eq!(d.len(), DAWN_INTERVAL);
    assert_eq!(d[0], HALF_WAVE);
    assert_eq!(d[DAWN_INTERVAL - 1], 1);
    assert!(d.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn calibration_rejects_outliers_via_median() {
    let mut rig = Rig::new(DimmerConfig::default());
    // 35 bounce glitches, 36 true half-waves.
    rig.hw.scripted.extend(std::iter::repeat_n(3, 20));
    rig.hw.scripted.extend(std::iter::repeat_n(60_000, 15));
    rig.edges(DAWN_INTERVAL);
    assert_eq!(rig.ctl.curve().map(|c| c.half_wave_ticks()), Some(HALF_WAVE));
}

#[test]
fn calibration_emits_event_and_lights_indicator() {
    let rig = Rig::calibrated(DimmerConfig::default());
    assert_eq!(
        rig.sink.events,
        vec![
            DimmerEvent::Started(ModeId::Calibrating),
            DimmerEvent::CalibrationComplete {
                half_wave_ticks: HALF_WAVE,
                mains_centihertz: 6009,
            },
            DimmerEvent::ModeChanged {
                from: ModeId::Calibrating,
                to: ModeId::Normal,
            },
        ]
    );
    assert_eq!(rig.hw.indicator_on(), Some(true));
}

#[test]
fn gate_is_never_driven_while_calibrating() {
    let mut rig = Rig::new(DimmerConfig::default());
    rig.hw.button = true;
    rig.edges(DAWN_INTERVAL - 1);
    rig.ctl.on_pulse_on_fire(&mut rig.hw);
    rig.ctl.on_pulse_off_fire(&mut rig.hw);

    assert!(!rig.hw.gate_on());
    assert_eq!(rig.hw.arm_count(), 0);
    assert_eq!(rig.ctl.mode(), ModeId::Calibrating);
    // Clock does not run until calibrated.
    assert_eq!(rig.ctl.cycle(), 0);
}

// ── Gestures ──────────────────────────────────────────────────

#[test]
fn press_just_under_threshold_enters_sleep_in() {
    let mut rig = Rig::calibrated(DimmerConfig::default());
    rig.gesture(119);
    assert_eq!(rig.ctl.mode(), ModeId::SleepIn);
    assert!(rig
        .sink
        .events
        .contains(&DimmerEvent::Gesture { duration: 119 }));
    assert_eq!(rig.hw.indicator_on(), Some(false));
}

#[test]
fn press_at_threshold_enters_manual_on() {
    let mut rig = Rig::calibrated(DimmerConfig::default());
    rig.gesture(120);
    assert_eq!(rig.ctl.mode(), ModeId::ManualOn);
    assert_eq!(rig.ctl.manual_minutes_left(), 30);
}

#[test]
fn any_release_cancels_an_override() {
    let mut rig = Rig::calibrated(DimmerConfig::default());
    rig.gesture(2);
    assert_eq!(rig.ctl.mode(), ModeId::SleepIn);
    rig.gesture(500);
    assert_eq!(rig.ctl.mode(), ModeId::Normal);
    assert_eq!(rig.hw.indicator_on(), Some(true));

    rig.gesture(400);
    assert_eq!(rig.ctl.mode(), ModeId::ManualOn);
    rig.gesture(0);
    assert_eq!(rig.ctl.mode(), ModeId::Normal);
    assert_eq!(rig.ctl.manual_minutes_left(), 0);
}

#[test]
fn holding_forever_never_finishes_a_gesture() {
    let mut rig = Rig::calibrated(DimmerConfig::default());
    rig.hw.button = true;
    rig.edges(70_000);
    assert_eq!(rig.ctl.mode(), ModeId::Normal);

    rig.hw.button = false;
    rig.edge();
    // Saturated at u16::MAX: a long press.
    assert_eq!(rig.ctl.mode(), ModeId::ManualOn);
    assert_eq!(rig.ctl.manual_minutes_left(), u16::MAX / 4);
}

// ── Clock-driven transitions ──────────────────────────────────

#[test]
fn sleep_in_ends_at_ceiling_even_with_button_held() {
    let mut rig = Rig::calibrated(fast_clock(295));
    rig.gesture(1);
    assert_eq!(rig.ctl.mode(), ModeId::SleepIn);

    rig.hw.button = true;
    rig.run_until_minute(299);
    assert_eq!(rig.ctl.mode(), ModeId::SleepIn);
    rig.run_until_minute(300);
    assert_eq!(rig.ctl.mode(), ModeId::Normal);
}

#[test]
fn manual_on_counts_down_once_per_minute() {
    let mut rig = Rig::calibrated(fast_clock(900));
    rig.gesture(120);
    assert_eq!(rig.ctl.mode(), ModeId::ManualOn);
    assert_eq!(rig.ctl.manual_minutes_left(), 30);
    // 30 minutes left: far past the dawn steps, so full on.
    assert!(rig.hw.gate_on());

    let mut boundaries = 0;
    let mut saw_step_five = false;
    while rig.ctl.mode() == ModeId::ManualOn {
        let before = rig.ctl.manual_minutes_left();
        rig.edge();
        if rig.ctl.cycle() == 0 {
            boundaries += 1;
        } else {
            assert_eq!(rig.ctl.manual_minutes_left(), before);
        }
        if rig.ctl.mode() == ModeId::ManualOn && rig.ctl.manual_minutes_left() == 5 {
            let d = rig.ctl.curve().and_then(|c| c.delay(4)).expect("delay");
            assert_eq!(rig.hw.last_arm(), Some((d, d + 10)));
            saw_step_five = true;
        }
        assert!(boundaries <= 31);
    }
    assert!(saw_step_five);
    assert_eq!(boundaries, 31);
    assert_eq!(rig.ctl.mode(), ModeId::Normal);
}

// ── Phase-delay output ────────────────────────────────────────

#[test]
fn dawn_ramp_arms_pulses_then_goes_full_on() {
    let mut rig = Rig::calibrated(fast_clock(0));
    let curve = *rig.ctl.curve().expect("curve");

    rig.edge();
    assert_eq!(rig.ctl.intensity(), 0);
    assert_eq!(rig.hw.arm_count(), 0);

    rig.run_until_minute(1);
    assert_eq!(rig.hw.last_arm(), Some((HALF_WAVE, HALF_WAVE + 10)));

    rig.run_until_minute(STEPS as u16);
    let d = curve.as_slice()[STEPS - 1];
    assert_eq!(rig.hw.last_arm(), Some((d, d + 10)));

    rig.run_until_minute(STEPS as u16 + 1);
    let arms = rig.hw.arm_count();
    assert_eq!(rig.hw.calls.last(), Some(&HwCall::Gate(true)));
    rig.edge();
    assert_eq!(rig.hw.arm_count(), arms);

    rig.run_until_minute(64);
    assert_eq!(rig.hw.calls.last(), Some(&HwCall::Gate(false)));
}

#[test]
fn armed_pulse_fires_gate_on_then_off() {
    let mut rig = Rig::calibrated(fast_clock(3));
    rig.edge();
    assert!(rig.ctl.pending_pulse().is_some());
    rig.hw.calls.clear();

    rig.ctl.on_pulse_on_fire(&mut rig.hw);
    rig.ctl.on_pulse_off_fire(&mut rig.hw);
    assert_eq!(
        rig.hw.calls,
        vec![HwCall::Gate(true), HwCall::Disarm, HwCall::Gate(false)]
    );
    assert!(rig.ctl.pending_pulse().is_none());
}

#[test]
fn dark_minutes_only_ever_turn_the_gate_off() {
    let mut rig = Rig::calibrated(DimmerConfig::default());
    rig.hw.calls.clear();
    rig.edges(500);
    assert_eq!(rig.hw.calls.len(), 500);
    assert!(rig.hw.calls.iter().all(|c| *c == HwCall::Gate(false)));
}

#[test]
fn sleep_in_shifts_the_dawn_by_an_hour() {
    let mut rig = Rig::calibrated(fast_clock(58));
    rig.gesture(1);
    assert_eq!(rig.ctl.mode(), ModeId::SleepIn);

    rig.run_until_minute(60);
    assert_eq!(rig.ctl.intensity(), 0);
    rig.run_until_minute(61);
    assert_eq!(rig.ctl.intensity(), 1);
    assert_eq!(rig.hw.last_arm(), Some((HALF_WAVE, HALF_WAVE + 10)));
}

// ── Status board ──────────────────────────────────────────────

#[test]
fn status_board_mirrors_the_controller() {
    static BOARD: StatusBoard = StatusBoard::new();
    let mut rig = Rig::calibrated(fast_clock(100));
    rig.edges(25);
    rig.ctl.publish(&BOARD);

    let s = BOARD.snapshot();
    assert!(s.calibrated);
    assert_eq!(s.mode, ModeId::Normal);
    assert_eq!(s.minute, 102);
    assert_eq!(s.cycle, 5);
    assert_eq!(s.edges, (DAWN_INTERVAL + 25) as u32);
    assert_eq!(s.samples as usize, DAWN_INTERVAL);
}
