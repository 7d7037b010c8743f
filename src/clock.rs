//! Mains-derived day clock.
//!
//! There is no RTC: the only timebase is the count of zero-cross edges.
//! A missed edge is never corrected, it just makes the day slightly longer.

use crate::config::MINUTES_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    cycles_per_minute: u16,
    /// Half-cycles elapsed within the current minute.
    cycle: u16,
    /// Minutes elapsed within the day.
    minute: u16,
}

impl Clock {
    /// Start at `minute` of the internal day with an empty minute.
    pub const fn new(cycles_per_minute: u16, minute: u16) -> Self {
        Self {
            cycles_per_minute,
            cycle: 0,
            minute: minute % MINUTES_PER_DAY,
        }
    }

    /// Advance by one half-cycle.  Returns `true` when the cycle counter
    /// wrapped, i.e. a minute boundary was crossed.
    pub fn tick(&mut self) -> bool {
        self.cycle += 1;
        if self.cycle < self.cycles_per_minute {
            return false;
        }
        self.cycle = 0;
        self.minute = (self.minute + 1) % MINUTES_PER_DAY;
        true
    }

    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    pub fn minute(&self) -> u16 {
        self.minute
    }
}
