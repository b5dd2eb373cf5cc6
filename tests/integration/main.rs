//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on a virtual clock with no
//! camera, OCR engine or motor controller required.

mod dispatch_tests;
mod mock_hw;
mod sensing_loop_tests;
