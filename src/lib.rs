//! PillDispenser controller library.
//!
//! Camera frames are classified (OCR + fuzzy label match, or object
//! detection) and each classification triggers at most one timed
//! actuation routine on a remote motor controller, subject to a cooldown.
//!
//! The pure-logic modules are exposed for integration testing; process,
//! filesystem and network access live in [`adapters`].

#![deny(unused_must_use)]

pub mod actuation;
pub mod adapters;
pub mod app;
pub mod classify;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod scheduler;
pub mod sensing;
