//! Port traits — the hexagonal boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (contactor, indicator, fault latch, serial link)
//! implement these traits.  The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the control core never touches hardware directly and
//! every test can substitute a recording mock.

use crate::fsm::State;
use crate::status::StatusRecord;

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → contactor)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the charging contactor.
///
/// Implementations MUST be idempotent: commanding an already-energised
/// contactor on (or an already-open one off) is a no-op, because the
/// transition table re-asserts the desired level on every dispatch.
pub trait ActuatorPort {
    /// Close the contactor (charging current may flow).
    fn energize(&mut self);

    /// Open the contactor.
    fn de_energize(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → fault lamp)
// ───────────────────────────────────────────────────────────────

/// Drive mode of the fault indicator lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    /// Lamp dark (no fault being signalled).
    Off,
    /// Lamp continuously lit (communication fault).
    Steady,
    /// Lamp toggling with the given full period (module fault).
    Blink { period_ms: u32 },
}

/// Write-side port for the fault indicator.  The adapter owns the blink
/// phase; the domain only states the mode.
pub trait IndicatorPort {
    fn set_indicator(&mut self, mode: IndicatorMode);
}

// ───────────────────────────────────────────────────────────────
// Watchdog port (domain → task watchdog)
// ───────────────────────────────────────────────────────────────

/// Feed the task watchdog.  Fault-containment loops call this once per
/// iteration so a multi-second recovery does not trip the timer.
pub trait WatchdogPort {
    fn refresh(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Fault latch port (domain → latch line)
// ───────────────────────────────────────────────────────────────

/// Controls the external communication-fault latch line.
pub trait FaultLatchPort {
    /// `true` asserts the latch, `false` releases it (drives the line
    /// low), which is how a resolved communication fault is cleared.
    fn write_fault_latch(&mut self, asserted: bool);
}

// ───────────────────────────────────────────────────────────────
// Link port (domain ↔ supervisor serial link)
// ───────────────────────────────────────────────────────────────

/// The supervisor-facing serial link.  Owns the shared [`StatusRecord`]
/// because received charging-status opcodes update it directly.
pub trait LinkPort {
    fn status(&self) -> &StatusRecord;

    fn status_mut(&mut self) -> &mut StatusRecord;

    /// Drain and decode buffered receive bytes, queueing any decoded
    /// command events.
    fn service(&mut self);

    /// Encode and send one telemetry frame for the given control state.
    fn transmit(&mut self, state: State);

    /// Verify the receive-buffer guard words, restoring them (and
    /// logging) if an overflow clobbered either.  Returns `true` when
    /// both guards were intact.
    fn check_overflow_guard(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// telemetry frame, nothing).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
