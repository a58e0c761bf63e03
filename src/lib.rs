//! Charging-module actuator firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod containment;
pub mod error;
pub mod fsm;
pub mod monitor;
pub mod status;
pub mod events;

mod pins;

// The hardware-facing modules compile on both targets; the ESP-IDF
// halves are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
