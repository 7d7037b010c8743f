//! Sunalarm Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PinAdapter (MainsPort + GatePort)        QueueSink / LogSink  │
//! │    PinDriver ×3 · EspPulseTimer            (EventSink)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Calibration · Clock · Button · FSM · PhaseScheduler   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//!
//!  zero-cross ISR ──notify──▶ zero-cross task ──▶ CORE.on_zero_cross
//!  esp_timer task ─────────────────────────────▶ CORE.on_pulse_*_fire
//!  main loop: drain events → log · feed watchdog · status line (atomics only)
//! ```
#![deny(unused_must_use)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_svc::hal::task;
use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;
use esp_idf_svc::timer::EspTaskTimerService;
use heapless::spsc::Queue;
use log::{error, info};

use sunalarm::adapters::hardware::{PinAdapter, PulseEdge};
use sunalarm::adapters::log_sink::LogEventSink;
use sunalarm::adapters::queue_sink::{drain_into, QueueSink, EVENT_QUEUE_CAP};
use sunalarm::app::events::DimmerEvent;
use sunalarm::app::service::Controller;
use sunalarm::app::shared::SharedCell;
use sunalarm::app::status::StatusBoard;
use sunalarm::config::DimmerConfig;
use sunalarm::drivers::esp_timer::EspPulseTimer;
use sunalarm::drivers::hw_init;
use sunalarm::drivers::watchdog::Watchdog;
use sunalarm::pins;

// ── Shared state ──────────────────────────────────────────────

type Board = PinAdapter<
    PinDriver<'static, AnyOutputPin, Output>,
    PinDriver<'static, AnyOutputPin, Output>,
    PinDriver<'static, AnyInputPin, Input>,
    EspPulseTimer,
>;

/// Everything the three entry points need, owned as one unit.
struct Core {
    controller: Controller,
    hw: Board,
    sink: QueueSink<'static, EVENT_QUEUE_CAP>,
}

static CORE: SharedCell<Core> = SharedCell::new();
static STATUS: StatusBoard = StatusBoard::new();
static DROPPED_EVENTS: AtomicU32 = AtomicU32::new(0);

const LOOP_PERIOD: Duration = Duration::from_millis(100);
const STATUS_PERIOD: Duration = Duration::from_secs(60);

// ── Zero-cross task ───────────────────────────────────────────

fn zero_cross_task() {
    let Some(me) = task::current() else {
        error!("zero-cross task has no handle, dimmer disabled");
        return;
    };
    if let Err(e) = hw_init::init_zero_cross_isr(me) {
        error!("{}: dimmer disabled", e);
        return;
    }

    loop {
        if task::wait_notification(BLOCK).is_some() {
            CORE.with(|core| {
                core.controller.on_zero_cross(&mut core.hw, &mut core.sink);
                core.controller.publish(&STATUS);
            });
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sunalarm v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = DimmerConfig::default();
    info!("Config: {}", serde_json::to_string(&config)?);
    let mut controller = Controller::new(config)?;

    // ── 3. Pins ───────────────────────────────────────────────
    // SAFETY: pin numbers come from `pins`, and each is claimed exactly
    // once here; the zero-cross pin is owned by hw_init.
    let gate = PinDriver::output(unsafe { AnyOutputPin::new(pins::GATE_GPIO) })?;
    let indicator = PinDriver::output(unsafe { AnyOutputPin::new(pins::INDICATOR_GPIO) })?;
    let mut button = PinDriver::input(unsafe { AnyInputPin::new(pins::BUTTON_GPIO) })?;
    button.set_pull(Pull::Up)?;

    // ── 4. Gate timer ─────────────────────────────────────────
    let timer_service = EspTaskTimerService::new()?;
    let pulse_timer = EspPulseTimer::new(
        &timer_service,
        || {
            let fired_at = hw_init::now_us();
            CORE.with(|core| {
                if core.hw.claim_fire(PulseEdge::On, fired_at) {
                    core.controller.on_pulse_on_fire(&mut core.hw);
                }
            });
        },
        || {
            let fired_at = hw_init::now_us();
            CORE.with(|core| {
                if core.hw.claim_fire(PulseEdge::Off, fired_at) {
                    core.controller.on_pulse_off_fire(&mut core.hw);
                }
            });
        },
    )?;
    let mut hw = PinAdapter::new(gate, indicator, button, pulse_timer);

    // ── 5. Event queue ────────────────────────────────────────
    let queue: &'static mut Queue<DimmerEvent, EVENT_QUEUE_CAP> =
        Box::leak(Box::new(Queue::new()));
    let (producer, mut consumer) = queue.split();
    let mut sink = QueueSink::new(producer, &DROPPED_EVENTS);

    controller.start(&mut hw, &mut sink);
    controller.publish(&STATUS);
    CORE.install(Core {
        controller,
        hw,
        sink,
    });

    // ── 6. Zero-cross task (high priority) ────────────────────
    ThreadSpawnConfiguration {
        name: Some(b"zero-cross\0"),
        priority: 20,
        ..Default::default()
    }
    .set()?;
    let _zero_cross = std::thread::Builder::new()
        .stack_size(6 * 1024)
        .spawn(zero_cross_task)?;
    ThreadSpawnConfiguration::default().set()?;

    // ── 7. Main loop ──────────────────────────────────────────
    let watchdog = Watchdog::default();
    let mut log_sink = LogEventSink::new();
    let mut last_status = Instant::now();

    info!("Entering main loop");
    loop {
        drain_into(&mut consumer, &mut log_sink);
        watchdog.feed();

        if last_status.elapsed() >= STATUS_PERIOD {
            last_status = Instant::now();
            let s = STATUS.snapshot();
            info!(
                "STATUS | {:?} | calibrated={} samples={} | {:02}:{:02} (minute {}) | \
                 intensity={} manual_left={} | edges={} isr_edges={} dropped_events={}",
                s.mode,
                s.calibrated,
                s.samples,
                s.hour_of_day(),
                s.wall_minute() % 60,
                s.minute,
                s.intensity,
                s.manual_minutes_left,
                s.edges,
                hw_init::edge_count(),
                DROPPED_EVENTS.load(Ordering::Relaxed),
            );
        }

        std::thread::sleep(LOOP_PERIOD);
    }
}
