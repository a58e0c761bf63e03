//! System configuration parameters
//!
//! All tunable parameters for the charging-module controller.  There is
//! no persistence layer on this board — values are compiled-in defaults,
//! overridable at construction (e.g. by a factory-test harness).

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    // --- Fault thresholds ---
    /// Module current (A) above which a leak is assumed while not charging
    pub leak_current_threshold_a: f32,
    /// Module temperature (°C) above which the overheat recovery engages
    pub temp_high_threshold_c: f32,

    // --- Fault indicator ---
    /// Indicator blink period during current-leak recovery (milliseconds)
    pub leak_blink_period_ms: u32,
    /// Indicator blink period during overheat recovery (milliseconds)
    pub overheat_blink_period_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds); one recovery iteration per tick
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            // Fault thresholds
            leak_current_threshold_a: 1.0,
            temp_high_threshold_c: 70.0,

            // Indicator: slow blink for leak, fast blink for overheat
            leak_blink_period_ms: 3000,
            overheat_blink_period_ms: 1000,

            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 5,
        }
    }
}

impl ModuleConfig {
    /// Range-check the configuration. Called once at boot; a bad config
    /// is a build/provisioning defect, not something to run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.leak_current_threshold_a <= 0.0 {
            return Err(Error::Config("leak_current_threshold_a must be positive"));
        }
        if self.temp_high_threshold_c <= 0.0 {
            return Err(Error::Config("temp_high_threshold_c must be positive"));
        }
        if self.leak_blink_period_ms == 0 || self.overheat_blink_period_ms == 0 {
            return Err(Error::Config("blink periods must be non-zero"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control_loop_interval_ms must be non-zero"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(Error::Config("telemetry_interval_secs must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = ModuleConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.leak_current_threshold_a > 0.0);
        assert!(c.temp_high_threshold_c > 0.0);
        assert!(c.control_loop_interval_ms > 0);
    }

    #[test]
    fn leak_blink_slower_than_overheat() {
        let c = ModuleConfig::default();
        assert!(
            c.leak_blink_period_ms > c.overheat_blink_period_ms,
            "leak recovery blinks slower so the two faults are distinguishable"
        );
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = ModuleConfig::default();
        assert!(
            c.control_loop_interval_ms < c.telemetry_interval_secs * 1000,
            "control loop should be faster than telemetry"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let c = ModuleConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: ModuleConfig = serde_json::from_str(&json).unwrap();
        assert!((c.leak_current_threshold_a - c2.leak_current_threshold_a).abs() < 0.001);
        assert_eq!(c.leak_blink_period_ms, c2.leak_blink_period_ms);
        assert_eq!(c.telemetry_interval_secs, c2.telemetry_interval_secs);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = ModuleConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: ModuleConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.overheat_blink_period_ms, c2.overheat_blink_period_ms);
        assert!((c.temp_high_threshold_c - c2.temp_high_threshold_c).abs() < 0.001);
    }

    #[test]
    fn zero_threshold_rejected() {
        let c = ModuleConfig {
            leak_current_threshold_a: 0.0,
            ..ModuleConfig::default()
        };
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }
}
