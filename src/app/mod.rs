//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the dimmer's business rules: per-edge
//! orchestration, the status board and the event vocabulary.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod shared;
pub mod status;
