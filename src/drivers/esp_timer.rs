//! Gate pulse timer on top of ESP-IDF `esp_timer`.
//!
//! Two one-shot timers stand in for the two compare channels of a
//! hardware timer: one fires the gate, one releases it.  Delays are
//! counted from the zero-cross timestamp taken in the ISR, so task wake-up
//! latency does not shift the firing angle.
//!
//! Timer callbacks run in the `esp_timer` task, never in interrupt context.
//! A callback dispatched just before a re-arm can still be waiting on the
//! controller lock when the next pulse is armed; callbacks stamp their
//! dispatch time and [`ArmingLedger`] drops the ones that predate the
//! current arming.

use core::time::Duration;

use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
use log::warn;

use crate::adapters::hardware::{ArmingLedger, PulseEdge, PulseTimer};
use crate::config::TIMER_TICK_US;
use crate::drivers::hw_init;
use crate::error::{Error, Result};

pub struct EspPulseTimer {
    on: EspTimer<'static>,
    off: EspTimer<'static>,
    /// Edge timestamp consumed by the previous capture.
    last_edge_us: Option<u32>,
    ledger: ArmingLedger,
}

impl EspPulseTimer {
    /// Create both timers.  `on_fire` / `off_fire` should take
    /// [`hw_init::now_us`] before locking anything and pass it to
    /// [`PulseTimer::claim`].
    pub fn new(
        service: &EspTaskTimerService,
        on_fire: impl FnMut() + Send + 'static,
        off_fire: impl FnMut() + Send + 'static,
    ) -> Result<Self> {
        let on = service
            .timer(on_fire)
            .map_err(|_| Error::Init("pulse-on timer create failed"))?;
        let off = service
            .timer(off_fire)
            .map_err(|_| Error::Init("pulse-off timer create failed"))?;
        Ok(Self {
            on,
            off,
            last_edge_us: None,
            ledger: ArmingLedger::new(),
        })
    }

    fn cancel_both(&self) {
        if let Err(e) = self.on.cancel() {
            warn!("pulse-on cancel failed: {}", e);
        }
        if let Err(e) = self.off.cancel() {
            warn!("pulse-off cancel failed: {}", e);
        }
    }
}

impl PulseTimer for EspPulseTimer {
    fn capture(&mut self) -> u32 {
        let edge = hw_init::last_edge_us();
        let Some(prev) = self.last_edge_us.replace(edge) else {
            return 0;
        };
        edge.wrapping_sub(prev) / TIMER_TICK_US
    }

    fn arm(&mut self, on_delay: u32, off_delay: u32) {
        self.cancel_both();

        let now = hw_init::now_us();
        let since_edge = now.wrapping_sub(hw_init::last_edge_us());
        let on_us = on_delay.saturating_mul(TIMER_TICK_US).saturating_sub(since_edge);
        let off_us = off_delay.saturating_mul(TIMER_TICK_US).saturating_sub(since_edge);

        self.ledger.arm(now.wrapping_add(on_us), now.wrapping_add(off_us));

        if let Err(e) = self.on.after(Duration::from_micros(on_us as u64)) {
            warn!("pulse-on arm failed: {}", e);
        }
        if let Err(e) = self.off.after(Duration::from_micros(off_us as u64)) {
            warn!("pulse-off arm failed: {}", e);
        }
    }

    fn disarm(&mut self) {
        self.cancel_both();
        self.ledger.disarm();
    }

    fn claim(&mut self, edge: PulseEdge, fired_at_us: u32) -> bool {
        self.ledger.claim(edge, fired_at_us)
    }
}
