//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements           | Connects to                    |
//! |--------------|----------------------|--------------------------------|
//! | `hardware`   | MainsPort, GatePort  | embedded-hal pins + PulseTimer |
//! | `log_sink`   | EventSink            | Serial log output              |
//! | `queue_sink` | EventSink            | SPSC queue to the main loop    |

pub mod hardware;
pub mod log_sink;
pub mod queue_sink;
