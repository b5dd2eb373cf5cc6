//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the dispenser: turning a
//! classification into at most one timed actuation routine, with cooldown.
//! All interaction with the camera, recognizers, actuator and clock
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real devices.

pub mod events;
pub mod ports;
pub mod service;
