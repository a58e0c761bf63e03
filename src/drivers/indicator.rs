//! Fault indicator lamp driver.
//!
//! One digital output, three drive modes: off, steady on (communication
//! fault) and square-wave blink (module fault, period set by the fault
//! kind).  The control service states the mode; the main loop calls
//! `tick()` each cycle and this driver owns the blink phase.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the lamp GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::app::ports::IndicatorMode;
use crate::drivers::hw_init;
use crate::pins;

pub struct Indicator {
    mode: IndicatorMode,
    phase_ms: u32,
    lit: bool,
}

impl Indicator {
    pub fn new() -> Self {
        Self {
            mode: IndicatorMode::Off,
            phase_ms: 0,
            lit: false,
        }
    }

    /// Change the drive mode.  The blink phase restarts on every mode
    /// change so a fresh blink session always begins lit.
    pub fn set_mode(&mut self, mode: IndicatorMode) {
        if mode != self.mode {
            self.mode = mode;
            self.phase_ms = 0;
            let lit = !matches!(mode, IndicatorMode::Off);
            self.drive(lit);
        }
    }

    /// Advance the blink phase.  `delta_ms` is the time since the last
    /// call (typically the control-loop interval).
    pub fn tick(&mut self, delta_ms: u32) {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);
        let lit = match self.mode {
            IndicatorMode::Off => false,
            IndicatorMode::Steady => true,
            IndicatorMode::Blink { period_ms } => {
                let period = period_ms.max(2);
                (self.phase_ms % period) < period / 2
            }
        };
        if lit != self.lit {
            self.drive(lit);
        }
    }

    #[allow(dead_code)]
    pub fn mode(&self) -> IndicatorMode {
        self.mode
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn drive(&mut self, lit: bool) {
        hw_init::gpio_write(pins::INDICATOR_GPIO, lit);
        self.lit = lit;
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}
