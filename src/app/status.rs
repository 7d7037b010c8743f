//! Lock-free status board.
//!
//! Single writer (the edge handler, via
//! [`Controller::publish`](super::service::Controller::publish)), any
//! number of readers (main loop, diagnostics).  Every field is an
//! independent atomic: a [`snapshot`](StatusBoard::snapshot) taken while
//! an edge is being published may mix old and new values.  All fields are
//! plain counters or flags, so such a dirty read is harmless, and the
//! reader never blocks the edge handler.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::config::{DAWN_MIN, MINUTES_PER_DAY, WAKEUP};
use crate::fsm::ModeId;

pub struct StatusBoard {
    calibrated: AtomicBool,
    mode: AtomicU8,
    minute: AtomicU16,
    cycle: AtomicU16,
    manual_minutes_left: AtomicU16,
    intensity: AtomicU16,
    edges: AtomicU32,
    samples: AtomicU16,
}

/// Plain copy of the board at one (approximate) instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub calibrated: bool,
    pub mode: ModeId,
    pub minute: u16,
    pub cycle: u16,
    pub manual_minutes_left: u16,
    pub intensity: u16,
    pub edges: u32,
    pub samples: u16,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self {
            calibrated: AtomicBool::new(false),
            mode: AtomicU8::new(ModeId::Calibrating as u8),
            minute: AtomicU16::new(0),
            cycle: AtomicU16::new(0),
            manual_minutes_left: AtomicU16::new(0),
            intensity: AtomicU16::new(0),
            edges: AtomicU32::new(0),
            samples: AtomicU16::new(0),
        }
    }

    /// Overwrite every field.  Writer side only.
    pub fn publish(&self, s: &StatusSnapshot) {
        self.calibrated.store(s.calibrated, Ordering::Relaxed);
        self.mode.store(s.mode as u8, Ordering::Relaxed);
        self.minute.store(s.minute, Ordering::Relaxed);
        self.cycle.store(s.cycle, Ordering::Relaxed);
        self.manual_minutes_left
            .store(s.manual_minutes_left, Ordering::Relaxed);
        self.intensity.store(s.intensity, Ordering::Relaxed);
        self.samples.store(s.samples, Ordering::Relaxed);
        // Last, so a reader that sees the new edge count sees the rest too.
        self.edges.store(s.edges, Ordering::Release);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let edges = self.edges.load(Ordering::Acquire);
        StatusSnapshot {
            calibrated: self.calibrated.load(Ordering::Relaxed),
            mode: ModeId::from_index(self.mode.load(Ordering::Relaxed) as usize),
            minute: self.minute.load(Ordering::Relaxed),
            cycle: self.cycle.load(Ordering::Relaxed),
            manual_minutes_left: self.manual_minutes_left.load(Ordering::Relaxed),
            intensity: self.intensity.load(Ordering::Relaxed),
            edges,
            samples: self.samples.load(Ordering::Relaxed),
        }
    }
}

impl StatusSnapshot {
    /// Wall-clock minute of day, assuming internal minute 0 is the dawn
    /// start `DAWN_MIN` minutes before `WAKEUP`.
    pub fn wall_minute(&self) -> u16 {
        let origin = (WAKEUP * 60) as i32 - DAWN_MIN as i32;
        (self.minute as i32 + origin).rem_euclid(MINUTES_PER_DAY as i32) as u16
    }

    /// Wall-clock hour of day (0..24).
    pub fn hour_of_day(&self) -> u16 {
        self.wall_minute() / 60
    }
}
