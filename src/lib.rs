//! Sunalarm firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by the `espidf`
//! feature.

#![deny(unused_must_use)]

pub mod app;
pub mod calibration;
pub mod clock;
pub mod config;
pub mod error;
pub mod fsm;
pub mod scheduler;

pub mod adapters;
pub mod drivers;

#[cfg(feature = "espidf")]
pub mod pins;
