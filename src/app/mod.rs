//! Application core — pure control logic, zero I/O.
//!
//! This module contains the business rules for the charging module:
//! state-machine orchestration, fault containment entry points and the
//! event queue.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
