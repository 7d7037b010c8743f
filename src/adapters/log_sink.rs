//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured controller events to
//! the `log` facade (the ESP-IDF logger on the board, UART / USB-CDC).
//! Runs in the main loop, fed from [`QueueSink`](super::queue_sink::QueueSink).

use log::info;

use crate::app::events::DimmerEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DimmerEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DimmerEvent) {
        match event {
            DimmerEvent::Started(mode) => {
                info!("START | initial_mode={:?}", mode);
            }
            DimmerEvent::CalibrationComplete {
                half_wave_ticks,
                mains_centihertz,
            } => {
                info!(
                    "CALIB | half_wave={} ticks | mains={}.{:02} Hz",
                    half_wave_ticks,
                    mains_centihertz / 100,
                    mains_centihertz % 100,
                );
            }
            DimmerEvent::ModeChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            DimmerEvent::Gesture { duration } => {
                info!("BUTTON | released after {} half-cycles", duration);
            }
        }
    }
}
