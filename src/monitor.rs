//! Threshold monitor.
//!
//! Runs **every tick before the event queue is drained** and turns the
//! analog fields of the status record (module current, module
//! temperature) into edge-triggered events for the state machine:
//!
//! - temperature rising through the high threshold emits `Hot`
//! - temperature falling back below it emits `Cool`
//! - current above the leak threshold while the pack reports
//!   NotCharging emits `ModuleFault`
//!
//! Each condition is latched so the event fires once per excursion,
//! not once per tick.  The fault-containment loops re-read the raw
//! fields themselves, so no "leak cleared" event exists — clearing the
//! latch just re-arms the edge.

use log::{error, info, warn};

use crate::config::ModuleConfig;
use crate::fsm::Event;
use crate::status::{ChargingStatus, StatusRecord};

/// Edge detector over the shared status record.
pub struct ThresholdMonitor {
    leak_threshold_a: f32,
    temp_high_c: f32,
    /// Latched: temperature is above the high threshold.
    hot: bool,
    /// Latched: leak current observed while not charging.
    leaking: bool,
}

impl ThresholdMonitor {
    pub fn new(config: &ModuleConfig) -> Self {
        Self {
            leak_threshold_a: config.leak_current_threshold_a,
            temp_high_c: config.temp_high_threshold_c,
            hot: false,
            leaking: false,
        }
    }

    /// Evaluate both thresholds against the latest status record.
    /// Returns the events whose conditions crossed an edge this tick.
    pub fn evaluate(&mut self, status: &StatusRecord) -> heapless::Vec<Event, 2> {
        let mut events = heapless::Vec::new();

        let temp = status.module_temperature_c();
        if temp > self.temp_high_c {
            if !self.hot {
                self.hot = true;
                warn!("module temperature {temp:.1} C above {:.1} C", self.temp_high_c);
                let _ = events.push(Event::Hot);
            }
        } else if self.hot {
            self.hot = false;
            info!("module temperature back below {:.1} C", self.temp_high_c);
            let _ = events.push(Event::Cool);
        }

        let current = status.module_current_a();
        let leak = status.charging() == ChargingStatus::NotCharging
            && current > self.leak_threshold_a;
        if leak {
            if !self.leaking {
                self.leaking = true;
                error!(
                    "leak current {current:.2} A above {:.2} A while not charging",
                    self.leak_threshold_a
                );
                let _ = events.push(Event::ModuleFault);
            }
        } else {
            self.leaking = false;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(current_a: f32, temp_c: f32, charging: ChargingStatus) -> StatusRecord {
        let mut r = StatusRecord::default();
        r.set_module_current_a(current_a);
        r.set_module_temperature_c(temp_c);
        r.set_charging(charging);
        r
    }

    #[test]
    fn hot_edge_fires_once() {
        let cfg = ModuleConfig::default();
        let mut mon = ThresholdMonitor::new(&cfg);
        let r = record(0.0, cfg.temp_high_threshold_c + 5.0, ChargingStatus::Charging);

        let first = mon.evaluate(&r);
        assert_eq!(first.as_slice(), &[Event::Hot]);

        let second = mon.evaluate(&r);
        assert!(second.is_empty());
    }

    #[test]
    fn cooling_down_emits_cool() {
        let cfg = ModuleConfig::default();
        let mut mon = ThresholdMonitor::new(&cfg);
        let hot = record(0.0, cfg.temp_high_threshold_c + 5.0, ChargingStatus::Charging);
        let cool = record(0.0, cfg.temp_high_threshold_c - 5.0, ChargingStatus::Charging);

        assert_eq!(mon.evaluate(&hot).as_slice(), &[Event::Hot]);
        assert_eq!(mon.evaluate(&cool).as_slice(), &[Event::Cool]);
        assert!(mon.evaluate(&cool).is_empty());
    }

    #[test]
    fn leak_requires_not_charging() {
        let cfg = ModuleConfig::default();
        let mut mon = ThresholdMonitor::new(&cfg);
        let leak_while_charging = record(
            cfg.leak_current_threshold_a + 1.0,
            25.0,
            ChargingStatus::Charging,
        );
        assert!(mon.evaluate(&leak_while_charging).is_empty());

        let leak_idle = record(
            cfg.leak_current_threshold_a + 1.0,
            25.0,
            ChargingStatus::NotCharging,
        );
        assert_eq!(mon.evaluate(&leak_idle).as_slice(), &[Event::ModuleFault]);
    }

    #[test]
    fn leak_edge_rearms_after_clearing() {
        let cfg = ModuleConfig::default();
        let mut mon = ThresholdMonitor::new(&cfg);
        let leaking = record(
            cfg.leak_current_threshold_a * 2.0,
            25.0,
            ChargingStatus::NotCharging,
        );
        let quiet = record(0.0, 25.0, ChargingStatus::NotCharging);

        assert_eq!(mon.evaluate(&leaking).as_slice(), &[Event::ModuleFault]);
        assert!(mon.evaluate(&leaking).is_empty());
        assert!(mon.evaluate(&quiet).is_empty());
        assert_eq!(mon.evaluate(&leaking).as_slice(), &[Event::ModuleFault]);
    }

    #[test]
    fn simultaneous_edges_emit_both_events() {
        let cfg = ModuleConfig::default();
        let mut mon = ThresholdMonitor::new(&cfg);
        let r = record(
            cfg.leak_current_threshold_a + 0.5,
            cfg.temp_high_threshold_c + 10.0,
            ChargingStatus::NotCharging,
        );

        let events = mon.evaluate(&r);
        assert_eq!(events.as_slice(), &[Event::Hot, Event::ModuleFault]);
    }
}
