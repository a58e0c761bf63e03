//! Charging contactor driver.
//!
//! Single digital output through an opto-isolated gate driver.  HIGH
//! closes the contactor and lets charging current flow.
//!
//! ## Safety contract
//!
//! The contactor must never be closed while a fault is being contained
//! (except the overheat recovery loop, which closes it to power the
//! cooling stage).  Enforced by the control service; this driver is a
//! dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the gate GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use log::info;

use crate::drivers::hw_init;
use crate::pins;

pub struct Contactor {
    energized: bool,
}

impl Contactor {
    /// The gate GPIO is already driven low by `hw_init`, so a fresh
    /// driver always reflects an open contactor.
    pub fn new() -> Self {
        Self { energized: false }
    }

    pub fn energize(&mut self) {
        hw_init::gpio_write(pins::CONTACTOR_GPIO, true);
        if !self.energized {
            info!("contactor closed");
        }
        self.energized = true;
    }

    pub fn de_energize(&mut self) {
        hw_init::gpio_write(pins::CONTACTOR_GPIO, false);
        if self.energized {
            info!("contactor opened");
        }
        self.energized = false;
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }
}

impl Default for Contactor {
    fn default() -> Self {
        Self::new()
    }
}
