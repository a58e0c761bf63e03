//! Communication-fault latch driver.
//!
//! The supervisor-side hardware latches this level signal when a link
//! fault is flagged.  Driving the line LOW releases the latch; fault
//! containment does that once the charging status is readable again.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the latch GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use log::info;

use crate::drivers::hw_init;
use crate::pins;

pub struct FaultLatch {
    asserted: bool,
}

impl FaultLatch {
    pub fn new() -> Self {
        Self { asserted: false }
    }

    pub fn set(&mut self, asserted: bool) {
        hw_init::gpio_write(pins::FAULT_LATCH_GPIO, asserted);
        if self.asserted && !asserted {
            info!("fault latch released");
        }
        self.asserted = asserted;
    }

    #[allow(dead_code)]
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }
}

impl Default for FaultLatch {
    fn default() -> Self {
        Self::new()
    }
}
