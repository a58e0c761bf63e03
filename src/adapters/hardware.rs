//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the contactor, indicator, fault-latch and watchdog drivers,
//! exposing them through [`ActuatorPort`], [`IndicatorPort`],
//! [`FaultLatchPort`] and [`WatchdogPort`].  This is the only module in
//! the system that touches actual hardware.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{
    ActuatorPort, FaultLatchPort, IndicatorMode, IndicatorPort, WatchdogPort,
};
use crate::drivers::contactor::Contactor;
use crate::drivers::fault_latch::FaultLatch;
use crate::drivers::indicator::Indicator;
use crate::drivers::watchdog::Watchdog;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    contactor: Contactor,
    indicator: Indicator,
    latch: FaultLatch,
    watchdog: Watchdog,
}

impl HardwareAdapter {
    pub fn new(
        contactor: Contactor,
        indicator: Indicator,
        latch: FaultLatch,
        watchdog: Watchdog,
    ) -> Self {
        Self {
            contactor,
            indicator,
            latch,
            watchdog,
        }
    }

    /// Advance the indicator blink phase.  Called once per control tick
    /// from the main loop; the domain only ever sets the mode.
    pub fn tick_indicator(&mut self, delta_ms: u32) {
        self.indicator.tick(delta_ms);
    }

    #[allow(dead_code)]
    pub fn contactor_energized(&self) -> bool {
        self.contactor.is_energized()
    }

    #[allow(dead_code)]
    pub fn indicator_lit(&self) -> bool {
        self.indicator.is_lit()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn energize(&mut self) {
        self.contactor.energize();
    }

    fn de_energize(&mut self) {
        self.contactor.de_energize();
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn set_indicator(&mut self, mode: IndicatorMode) {
        self.indicator.set_mode(mode);
    }
}

// ── WatchdogPort implementation ───────────────────────────────

impl WatchdogPort for HardwareAdapter {
    fn refresh(&mut self) {
        self.watchdog.refresh();
    }
}

// ── FaultLatchPort implementation ─────────────────────────────

impl FaultLatchPort for HardwareAdapter {
    fn write_fault_latch(&mut self, asserted: bool) {
        self.latch.set(asserted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> HardwareAdapter {
        HardwareAdapter::new(
            Contactor::new(),
            Indicator::new(),
            FaultLatch::new(),
            Watchdog::new(),
        )
    }

    #[test]
    fn ports_reach_the_drivers() {
        let mut hw = adapter();
        hw.energize();
        assert!(hw.contactor_energized());
        hw.de_energize();
        assert!(!hw.contactor_energized());

        hw.set_indicator(IndicatorMode::Steady);
        assert!(hw.indicator_lit());
        hw.set_indicator(IndicatorMode::Off);
        assert!(!hw.indicator_lit());
    }

    #[test]
    fn indicator_blinks_through_the_adapter() {
        let mut hw = adapter();
        hw.set_indicator(IndicatorMode::Blink { period_ms: 1000 });
        assert!(hw.indicator_lit());
        hw.tick_indicator(600);
        assert!(!hw.indicator_lit());
    }
}
