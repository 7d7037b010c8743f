//! Lock-free event queue adapter.
//!
//! The controller emits from the edge handler, where printing to the
//! console would stall the next zero crossing.  [`QueueSink`] pushes each
//! event into a `heapless` SPSC queue instead; the main loop drains the
//! consumer half into a [`LogEventSink`](super::log_sink::LogEventSink).
//!
//! ```text
//!  edge handler ──▶ QueueSink ──▶ spsc::Queue ──▶ main loop ──▶ LogEventSink
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use heapless::spsc::{Consumer, Producer};

use crate::app::events::DimmerEvent;
use crate::app::ports::EventSink;

/// Depth of the edge-handler → main-loop event queue.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Producer half of the event queue.  Events that do not fit are dropped
/// and counted in `dropped`, which readers load without touching the sink.
pub struct QueueSink<'q, const N: usize> {
    producer: Producer<'q, DimmerEvent, N>,
    dropped: &'q AtomicU32,
}

impl<'q, const N: usize> QueueSink<'q, N> {
    pub fn new(producer: Producer<'q, DimmerEvent, N>, dropped: &'q AtomicU32) -> Self {
        Self { producer, dropped }
    }

    /// Events lost to a full queue since startup.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> EventSink for QueueSink<'_, N> {
    fn emit(&mut self, event: &DimmerEvent) {
        if self.producer.enqueue(*event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Forward every queued event to `sink`.  Returns how many were drained.
pub fn drain_into<const N: usize>(
    consumer: &mut Consumer<'_, DimmerEvent, N>,
    sink: &mut impl EventSink,
) -> usize {
    let mut n = 0;
    while let Some(event) = consumer.dequeue() {
        sink.emit(&event);
        n += 1;
    }
    n
}
