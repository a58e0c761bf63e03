//! Shared status record — the sole channel between the control core and
//! the supervising system.
//!
//! The record is owned by the serial link adapter (it is what gets
//! reported upstream) and mutated by the core through the typed setters
//! below.  Sensor-side fields (current, temperature, charging status)
//! are written by collaborators and only *read* by fault handling.
//!
//! ```text
//!   link decoder ──▶ charging / current / temperature ──▶ StatusRecord
//!   control core ──▶ readiness / error flags ───────────▶ StatusRecord
//!   StatusRecord ──▶ StatusFrame ──▶ postcard ──▶ RS485 TX
//! ```
//!
//! Invariant: readiness is `NotReady` whenever the machine is in Reset
//! or a fault-containment session is active, `Ready` otherwise.  The
//! control service maintains this; the record itself is dumb storage.

use serde::{Deserialize, Serialize};

use crate::fsm::State;

// ---------------------------------------------------------------------------
// Field enumerations
// ---------------------------------------------------------------------------

/// Whether the module can accept new charging commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    Ready,
    #[default]
    NotReady,
}

impl Readiness {
    /// Wire code (1 = ready, 0 = not ready).
    pub const fn code(self) -> u8 {
        match self {
            Self::Ready => 1,
            Self::NotReady => 0,
        }
    }
}

/// Charging status as last reported over the supervisor link.
///
/// `Unknown` is the boot value and the value during a link outage; a
/// communication fault only resolves once this moves to a recognised
/// value again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargingStatus {
    NotCharging,
    Charging,
    #[default]
    Unknown,
}

impl ChargingStatus {
    pub const fn code(self) -> u8 {
        match self {
            Self::NotCharging => 0,
            Self::Charging => 1,
            Self::Unknown => 2,
        }
    }

    /// True for Charging or NotCharging — i.e. the link has reported a
    /// usable value.
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Module-side sub-error reported while fault containment runs.
/// Persists after a recovery loop ends; cleared when the error state
/// unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleErrorFlag {
    #[default]
    None,
    CurrentLeak,
    Overheat,
}

impl ModuleErrorFlag {
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::CurrentLeak => 1,
            Self::Overheat => 2,
        }
    }
}

/// Actuator-side error flag. Set on a hardware fault; held across
/// benign traffic and only cleared once the supervisor's reset cycle
/// completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorErrorFlag {
    #[default]
    None,
    HardwareFault,
}

impl ActuatorErrorFlag {
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::HardwareFault => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// The record
// ---------------------------------------------------------------------------

/// Process-lifetime status record. Fields are private; all access goes
/// through the typed methods so the write surface stays auditable.
#[derive(Debug, Clone, Default)]
pub struct StatusRecord {
    readiness: Readiness,
    actuator_error: ActuatorErrorFlag,
    module_error: ModuleErrorFlag,
    module_current_a: f32,
    module_temperature_c: f32,
    charging: ChargingStatus,
}

impl StatusRecord {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Core-side writes ──────────────────────────────────────

    pub fn set_readiness(&mut self, r: Readiness) {
        self.readiness = r;
    }

    pub fn set_actuator_error(&mut self, flag: ActuatorErrorFlag) {
        self.actuator_error = flag;
    }

    pub fn set_module_error(&mut self, flag: ModuleErrorFlag) {
        self.module_error = flag;
    }

    /// Clear both error flags (the containment no-error unwind).
    pub fn clear_error_flags(&mut self) {
        self.actuator_error = ActuatorErrorFlag::None;
        self.module_error = ModuleErrorFlag::None;
    }

    // ── Sensor-side writes (link decoder / sampling) ──────────

    pub fn set_charging(&mut self, c: ChargingStatus) {
        self.charging = c;
    }

    pub fn set_module_current_a(&mut self, amps: f32) {
        self.module_current_a = amps;
    }

    pub fn set_module_temperature_c(&mut self, celsius: f32) {
        self.module_temperature_c = celsius;
    }

    // ── Reads ─────────────────────────────────────────────────

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn actuator_error(&self) -> ActuatorErrorFlag {
        self.actuator_error
    }

    pub fn module_error(&self) -> ModuleErrorFlag {
        self.module_error
    }

    pub fn module_current_a(&self) -> f32 {
        self.module_current_a
    }

    pub fn module_temperature_c(&self) -> f32 {
        self.module_temperature_c
    }

    pub fn charging(&self) -> ChargingStatus {
        self.charging
    }
}

// ---------------------------------------------------------------------------
// Telemetry frame
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of the record plus the current state, in the
/// wire encoding the supervisor expects.  All fields are primitives so
/// the postcard layout stays stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFrame {
    pub seq: u32,
    pub state: u8,
    pub readiness: u8,
    pub actuator_error: u8,
    pub module_error: u8,
    pub charging: u8,
    pub module_current_a: f32,
    pub module_temperature_c: f32,
}

impl StatusFrame {
    /// Capture a frame from the live record.
    pub fn capture(seq: u32, state: State, record: &StatusRecord) -> Self {
        Self {
            seq,
            state: state.code(),
            readiness: record.readiness.code(),
            actuator_error: record.actuator_error.code(),
            module_error: record.module_error.code(),
            charging: record.charging.code(),
            module_current_a: record.module_current_a,
            module_temperature_c: record.module_temperature_c,
        }
    }
}
