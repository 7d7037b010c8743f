//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock adapters.  All tests run on the host with no real hardware.

mod controller_tests;
mod pulse_timing_tests;
