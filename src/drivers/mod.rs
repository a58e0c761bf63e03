//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod contactor;
pub mod fault_latch;
pub mod hw_init;
pub mod indicator;
pub mod watchdog;
