//! Fault containment for the error state.
//!
//! ```text
//!                    begin(CommFault)
//!   ┌──────────┐ ─────────────────────► ┌───────────────┐
//!   │ Inactive │                        │   CommRetry   │──┐ step(): poll link,
//!   └──────────┘ ◄───────────────────── └───────────────┘◄─┘ feed watchdog
//!       ▲  ▲       charging known:
//!       │  │       latch low + Complete
//!       │  │
//!       │  │     begin(ModuleFault)     ┌───────────────┐
//!       │  └─────────────────────────── │ LeakRecovery  │──┐ step(): blink slow,
//!       │        both conditions clear  └───────┬───────┘◄─┘ contactor open
//!       │        (no Complete)                  │ leak clear,
//!       │                                       ▼ still hot
//!       │                               ┌───────────────┐
//!       └────────────────────────────── │ OverheatRec.  │──┐ step(): blink fast,
//!                                       └───────────────┘◄─┘ contactor closed
//! ```
//!
//! Each containment path runs as a cooperative session: `begin` arms the
//! phase and executes the first iteration, the main loop then calls
//! [`FaultContainment::step`] once per tick until the session ends.  The
//! watchdog is refreshed inside every active iteration, so a recovery
//! that takes seconds never trips the task timer.
//!
//! A benign event reaching the error state while no session is running
//! is the unwind signal: flags are cleared and a synthetic `Complete` is
//! handed back for the state machine to consume.  A latched hardware
//! fault blocks that unwind; only the supervisor's reset sequence
//! releases it.

use log::{error, info};

use crate::app::ports::{
    ActuatorPort, FaultLatchPort, IndicatorMode, IndicatorPort, LinkPort, WatchdogPort,
};
use crate::config::ModuleConfig;
use crate::fsm::{Event, State};
use crate::status::{ActuatorErrorFlag, ChargingStatus, ModuleErrorFlag, Readiness, StatusRecord};

/// Which containment session is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Inactive,
    /// Polling the supervisor link until charging status is known.
    CommRetry,
    /// Slow-blink loop while leak current persists.
    LeakRecovery,
    /// Fast-blink loop while the module runs hot.
    OverheatRecovery,
}

/// Cooperative fault-containment engine.
///
/// Owned by the control service; all hardware access goes through the
/// port traits so tests drive it with mocks.
#[derive(Debug)]
pub struct FaultContainment {
    phase: Phase,
    iterations: u32,
}

impl FaultContainment {
    pub fn new() -> Self {
        Self {
            phase: Phase::Inactive,
            iterations: 0,
        }
    }

    /// Whether a recovery session is actively looping.
    pub fn active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    /// Enter containment for `trigger`.  Runs the first iteration of
    /// the matching session immediately; returns `Some(Complete)` when
    /// the fault resolved within that iteration (or when a benign event
    /// unwinds a quiescent error state).
    pub fn begin(
        &mut self,
        trigger: Event,
        config: &ModuleConfig,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
    ) -> Option<Event> {
        link.status_mut().set_readiness(Readiness::NotReady);

        match trigger {
            Event::CommFault => {
                error!("SAFETY FAULT SET: supervisor link fault, polling for status");
                self.phase = Phase::CommRetry;
                self.iterations = 0;
                hw.set_indicator(IndicatorMode::Steady);
                self.step_comm(hw, link)
            }
            Event::ModuleFault => {
                error!("SAFETY FAULT SET: module fault, entering recovery");
                self.phase = Phase::LeakRecovery;
                self.iterations = 0;
                self.step_leak(config, hw, link)
            }
            Event::HardwareFault => {
                error!("SAFETY FAULT SET: actuator hardware fault, contactor locked out");
                hw.de_energize();
                link.status_mut()
                    .set_actuator_error(ActuatorErrorFlag::HardwareFault);
                self.end_session(hw);
                None
            }
            Event::Start
            | Event::Stop
            | Event::Hot
            | Event::Cool
            | Event::Reset
            | Event::Complete => {
                if self.active() {
                    info!("event {trigger:?} deferred while fault recovery is running");
                    None
                } else if link.status().actuator_error() == ActuatorErrorFlag::HardwareFault {
                    info!("hardware fault latched, waiting for reset command");
                    None
                } else {
                    link.status_mut().clear_error_flags();
                    self.end_session(hw);
                    info!("SAFETY FAULT CLEARED: error state unwound");
                    Some(Event::Complete)
                }
            }
        }
    }

    /// Run one iteration of the active session, if any.  Called once
    /// per main-loop tick.
    pub fn step(
        &mut self,
        config: &ModuleConfig,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
    ) -> Option<Event> {
        match self.phase {
            Phase::Inactive => None,
            Phase::CommRetry => self.step_comm(hw, link),
            Phase::LeakRecovery => self.step_leak(config, hw, link),
            Phase::OverheatRecovery => self.step_overheat(config, hw, link),
        }
    }

    /// Abort any running session.  Called when the machine leaves the
    /// error state by supervisor command.
    pub fn cancel(&mut self, hw: &mut impl IndicatorPort) {
        if self.active() {
            info!("fault recovery session cancelled");
        }
        self.end_session(hw);
    }

    /// One poll of the supervisor link.  Resolution is gated on the
    /// charging status being known again: only then is the fault latch
    /// released and a synthetic `Complete` produced.
    fn step_comm(
        &mut self,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
    ) -> Option<Event> {
        self.iterations += 1;
        link.check_overflow_guard();
        hw.de_energize();
        link.service();
        hw.refresh();

        if link.status().charging().is_known() {
            hw.write_fault_latch(false);
            info!(
                "SAFETY FAULT CLEARED: link restored after {} poll(s)",
                self.iterations
            );
            self.end_session(hw);
            Some(Event::Complete)
        } else {
            None
        }
    }

    /// One iteration of the leak-recovery loop.  Falls through to the
    /// overheat loop once leak current has stopped, then ends the
    /// session (without a synthetic `Complete` — the module holds in
    /// the error state until an unwind event arrives).
    fn step_leak(
        &mut self,
        config: &ModuleConfig,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
    ) -> Option<Event> {
        if leak_active(link.status(), config) {
            self.iterations += 1;
            hw.de_energize();
            link.status_mut().set_module_error(ModuleErrorFlag::CurrentLeak);
            link.service();
            link.transmit(State::Error);
            hw.set_indicator(IndicatorMode::Blink {
                period_ms: config.leak_blink_period_ms,
            });
            hw.refresh();
            None
        } else if overheat_active(link.status(), config) {
            self.phase = Phase::OverheatRecovery;
            self.iterations = 0;
            self.step_overheat(config, hw, link)
        } else {
            self.finish_module_recovery(hw)
        }
    }

    /// One iteration of the overheat loop.  The contactor is closed
    /// here: the charging path powers the module's cooling stage.
    fn step_overheat(
        &mut self,
        config: &ModuleConfig,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
    ) -> Option<Event> {
        if overheat_active(link.status(), config) {
            self.iterations += 1;
            hw.energize();
            link.status_mut().set_module_error(ModuleErrorFlag::Overheat);
            link.service();
            link.transmit(State::Error);
            hw.set_indicator(IndicatorMode::Blink {
                period_ms: config.overheat_blink_period_ms,
            });
            hw.refresh();
            None
        } else {
            self.finish_module_recovery(hw)
        }
    }

    /// Both module loops have drained.  Contactor off (the overheat
    /// loop may have closed it), indicator off, session over.  The
    /// module error flag is left set for telemetry until the unwind.
    fn finish_module_recovery(
        &mut self,
        hw: &mut (impl ActuatorPort + IndicatorPort),
    ) -> Option<Event> {
        hw.de_energize();
        info!("module fault recovery loops finished, holding in error state");
        self.end_session(hw);
        None
    }

    fn end_session(&mut self, hw: &mut impl IndicatorPort) {
        hw.set_indicator(IndicatorMode::Off);
        self.phase = Phase::Inactive;
        self.iterations = 0;
    }
}

impl Default for FaultContainment {
    fn default() -> Self {
        Self::new()
    }
}

fn leak_active(status: &StatusRecord, config: &ModuleConfig) -> bool {
    status.charging() == ChargingStatus::NotCharging
        && status.module_current_a() > config.leak_current_threshold_a
}

fn overheat_active(status: &StatusRecord, config: &ModuleConfig) -> bool {
    status.module_temperature_c() > config.temp_high_threshold_c
}

// ── Tests ────────────────────────────────────────────────────
