//! Mains autocalibration and dawn curve synthesis.
//!
//! The half-wave period is measured rather than assumed, which also makes
//! the firmware indifferent to 50 Hz vs. 60 Hz mains.  A fixed number of
//! inter-edge intervals is captured, the median is taken (robust against
//! contact bounce and noise spikes), and the median period is turned into
//! the [`DawnCurve`]: one firing delay per dawn step.
//!
//! ```text
//!  delay(i) = max(1, median · ((N − i) / N)^4)      N = DAWN_INTERVAL
//!
//!  delay ▲
//! median │█
//!        │█▇
//!        │███▆▅
//!        │███████▄▃▂▁▁▁▁▁▁
//!      1 └─────────────────▶ i
//! ```

use heapless::Vec;
use log::{debug, info};

use crate::config::{DAWN_INTERVAL, TIMER_TICK_US};

/// Outcome of feeding one raw interval into the [`Calibrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Non-positive capture; dropped without counting.
    Rejected,
    /// Sample stored; `count` valid samples collected so far.
    Accepted { count: usize },
    /// The last required sample arrived and the curve is ready.
    Complete(DawnCurve),
}

/// Collects interval samples until enough have arrived to build the curve.
pub struct Calibrator {
    samples: Vec<u32, DAWN_INTERVAL>,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibrator {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Valid samples collected so far.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Feed one raw interval (timer ticks since the previous edge).
    ///
    /// Once [`SampleOutcome::Complete`] has been returned the sample buffer
    /// is empty again; callers stop feeding at that point.
    pub fn push(&mut self, raw_ticks: u32) -> SampleOutcome {
        if raw_ticks == 0 {
            return SampleOutcome::Rejected;
        }
        // Capacity equals DAWN_INTERVAL and the buffer is drained on
        // completion, so this push always has room.
        if self.samples.push(raw_ticks).is_err() {
            return SampleOutcome::Rejected;
        }
        let count = self.samples.len();
        debug!("calibration: sample {}/{} = {} ticks", count, DAWN_INTERVAL, raw_ticks);

        if count < DAWN_INTERVAL {
            return SampleOutcome::Accepted { count };
        }

        let period = median(&mut self.samples);
        self.samples.clear();
        let curve = DawnCurve::from_half_wave(period);
        info!(
            "calibration: half-wave = {} ticks (~{}.{:02} Hz mains)",
            period,
            curve.mains_centihertz() / 100,
            curve.mains_centihertz() % 100
        );
        SampleOutcome::Complete(curve)
    }
}

/// Middle element of the sorted samples.
fn median(samples: &mut [u32]) -> u32 {
    samples.sort_unstable();
    samples[samples.len() / 2]
}

/// Firing delays in timer ticks, one per dawn step.
///
/// Index 0 is the dimmest step (longest delay, ≈ one full half-wave);
/// entries never increase and are never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DawnCurve {
    half_wave_ticks: u32,
    delays: [u32; DAWN_INTERVAL],
}

impl DawnCurve {
    /// Synthesize the quartic ease-in curve from a measured half-wave.
    ///
    /// Division truncates after every multiplication, which keeps the
    /// intermediate values within a half-wave and reproduces the curve the
    /// device has always used.
    pub fn from_half_wave(half_wave_ticks: u32) -> Self {
        let n = DAWN_INTERVAL as u64;
        let mut delays = [0u32; DAWN_INTERVAL];
        for (i, slot) in delays.iter_mut().enumerate() {
            let remaining = n - i as u64;
            let mut d = u64::from(half_wave_ticks);
            for _ in 0..4 {
                d = d * remaining / n;
            }
            *slot = (d as u32).max(1);
        }
        Self {
            half_wave_ticks,
            delays,
        }
    }

    /// The measured (median) half-wave period in timer ticks.
    pub fn half_wave_ticks(&self) -> u32 {
        self.half_wave_ticks
    }

    /// Firing delay for a 0-based step, `None` past the end of the table.
    pub fn delay(&self, index: usize) -> Option<u32> {
        self.delays.get(index).copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.delays
    }

    /// Mains frequency implied by the measured half-wave, in 1/100 Hz.
    pub fn mains_centihertz(&self) -> u32 {
        let full_wave_us = 2 * u64::from(self.half_wave_ticks) * u64::from(TIMER_TICK_US);
        if full_wave_us == 0 {
            return 0;
        }
        (100_000_000 / full_wave_us) as u32
    }
}
