//! Control service — the hexagonal core.
//!
//! [`ControlService`] owns the state machine, the fault-containment
//! engine and the pending-event queue.  All I/O flows through port
//! traits injected at call sites, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!    LinkPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     ControlService     │
//! ActuatorPort ◀──│  FSM · Containment     │──▶ IndicatorPort
//!                 └────────────────────────┘
//! ```
//!
//! Events never dispatch recursively: a handler that produces a
//! follow-up event (the synthetic `Complete` from fault containment)
//! pushes it onto a small bounded queue, and the drain loop picks it up
//! next.  Queue depth 4 covers the worst real chain (fault → contain →
//! complete → idle) with room to spare.

use heapless::Deque;
use log::{info, warn};

use crate::config::ModuleConfig;
use crate::containment::FaultContainment;
use crate::fsm::states::readiness_policy;
use crate::fsm::{Action, Event, State, StateMachine};

use super::events::AppEvent;
use super::ports::{
    ActuatorPort, EventSink, FaultLatchPort, IndicatorPort, LinkPort, WatchdogPort,
};

const PENDING_EVENTS: usize = 4;

// ───────────────────────────────────────────────────────────────
// ControlService
// ───────────────────────────────────────────────────────────────

/// Orchestrates the charging-module control logic.
pub struct ControlService {
    machine: StateMachine,
    containment: FaultContainment,
    config: ModuleConfig,
    pending: Deque<Event, PENDING_EVENTS>,
    tick_count: u64,
}

impl ControlService {
    pub fn new(config: ModuleConfig) -> Self {
        Self {
            machine: StateMachine::new(),
            containment: FaultContainment::new(),
            config,
            pending: Deque::new(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the module to its quiescent boot posture: contactor open,
    /// status record showing Ready in Idle.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        hw.de_energize();
        apply_readiness(self.machine.state(), link);
        sink.emit(&AppEvent::Started(self.machine.state()));
        info!("control service started in {:?}", self.machine.state());
    }

    // ── Event handling ────────────────────────────────────────

    /// Queue one event and drain the queue to quiescence.
    pub fn handle_event(
        &mut self,
        event: Event,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        if self.pending.push_back(event).is_err() {
            warn!("pending event queue full, dropping {event:?}");
            return;
        }
        self.drain(hw, link, sink);
    }

    /// Advance one control tick: run the active fault-recovery
    /// iteration, if any, and dispatch whatever it produced.
    pub fn poll(
        &mut self,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        if let Some(follow) = self.containment.step(&self.config, hw, link) {
            sink.emit(&AppEvent::FaultResolved);
            if self.pending.push_back(follow).is_err() {
                warn!("pending event queue full, dropping {follow:?}");
            }
            self.drain(hw, link, sink);
        }
    }

    fn drain(
        &mut self,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        while let Some(event) = self.pending.pop_front() {
            self.dispatch_one(event, hw, link, sink);
        }
    }

    /// Dispatch a single event: readiness pre-write, pure table lookup,
    /// action execution, then transition commit.
    fn dispatch_one(
        &mut self,
        event: Event,
        hw: &mut (impl ActuatorPort + IndicatorPort + WatchdogPort + FaultLatchPort),
        link: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) {
        let prev = self.machine.state();
        apply_readiness(prev, link);

        let outcome = self.machine.dispatch(event);

        match outcome.action {
            Action::None => {}
            Action::ActuatorOn => hw.energize(),
            Action::ActuatorOff => hw.de_energize(),
            Action::Contain(trigger) => {
                if let Some(class) = trigger.fault_class() {
                    sink.emit(&AppEvent::FaultRaised(class));
                }
                if let Some(follow) = self.containment.begin(trigger, &self.config, hw, link) {
                    sink.emit(&AppEvent::FaultResolved);
                    if self.pending.push_back(follow).is_err() {
                        warn!("pending event queue full, dropping {follow:?}");
                    }
                }
            }
        }

        if let Some(next) = outcome.next {
            if prev == State::Error && next != State::Error {
                self.containment.cancel(hw);
            }
            self.machine.apply(next);
            apply_readiness(next, link);
            if prev == State::Reset && next == State::Idle {
                // Supervisor confirmed recovery: latched flags go too.
                link.status_mut().clear_error_flags();
            }
            sink.emit(&AppEvent::StateChanged { from: prev, to: next });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current control state.
    pub fn state(&self) -> State {
        self.machine.state()
    }

    /// Whether a fault-recovery session is actively looping.
    pub fn recovery_active(&self) -> bool {
        self.containment.active()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }
}

fn apply_readiness(state: State, link: &mut impl LinkPort) {
    if let Some(readiness) = readiness_policy(state) {
        link.status_mut().set_readiness(readiness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::IndicatorMode;
    use crate::error::FaultClass;
    use crate::status::{
        ActuatorErrorFlag, ChargingStatus, ModuleErrorFlag, Readiness, StatusRecord,
    };

    #[derive(Default)]
    struct MockHw {
        energized: bool,
        indicator: Option<IndicatorMode>,
        latch_writes: Vec<bool>,
        refreshes: u32,
    }

    impl ActuatorPort for MockHw {
        fn energize(&mut self) {
            self.energized = true;
        }
        fn de_energize(&mut self) {
            self.energized = false;
        }
    }
    impl IndicatorPort for MockHw {
        fn set_indicator(&mut self, mode: IndicatorMode) {
            self.indicator = Some(mode);
        }
    }
    impl WatchdogPort for MockHw {
        fn refresh(&mut self) {
            self.refreshes += 1;
        }
    }
    impl FaultLatchPort for MockHw {
        fn write_fault_latch(&mut self, asserted: bool) {
            self.latch_writes.push(asserted);
        }
    }

    #[derive(Default)]
    struct MockLink {
        record: StatusRecord,
    }

    impl LinkPort for MockLink {
        fn status(&self) -> &StatusRecord {
            &self.record
        }
        fn status_mut(&mut self) -> &mut StatusRecord {
            &mut self.record
        }
        fn service(&mut self) {}
        fn transmit(&mut self, _state: State) {}
        fn check_overflow_guard(&mut self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingSink(Vec<AppEvent>);

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(event.clone());
        }
    }

    fn harness() -> (ControlService, MockHw, MockLink, RecordingSink) {
        (
            ControlService::new(ModuleConfig::default()),
            MockHw::default(),
            MockLink::default(),
            RecordingSink::default(),
        )
    }

    #[test]
    fn starts_in_idle_with_contactor_open() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        hw.energized = true;

        svc.start(&mut hw, &mut link, &mut sink);

        assert_eq!(svc.state(), State::Idle);
        assert!(!hw.energized);
        assert_eq!(link.record.readiness(), Readiness::Ready);
        assert_eq!(sink.0, vec![AppEvent::Started(State::Idle)]);
    }

    #[test]
    fn start_event_energizes_and_transitions() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        svc.start(&mut hw, &mut link, &mut sink);

        svc.handle_event(Event::Start, &mut hw, &mut link, &mut sink);

        assert_eq!(svc.state(), State::Start);
        assert!(hw.energized);
        assert!(sink.0.contains(&AppEvent::StateChanged {
            from: State::Idle,
            to: State::Start,
        }));
    }

    #[test]
    fn comm_fault_resolves_within_one_pass_when_status_known() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        svc.start(&mut hw, &mut link, &mut sink);
        link.record.set_charging(ChargingStatus::Charging);

        svc.handle_event(Event::CommFault, &mut hw, &mut link, &mut sink);

        assert_eq!(svc.state(), State::Idle);
        assert!(!svc.recovery_active());
        assert!(!hw.energized);
        assert_eq!(hw.latch_writes, vec![false]);
        assert_eq!(hw.refreshes, 1, "the single poll iteration feeds the watchdog");
        assert!(sink
            .0
            .contains(&AppEvent::FaultRaised(FaultClass::Communication)));
        assert!(sink.0.contains(&AppEvent::FaultResolved));
        assert_eq!(link.record.readiness(), Readiness::Ready);
    }

    #[test]
    fn module_fault_holds_in_error_until_unwind() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        svc.start(&mut hw, &mut link, &mut sink);
        link.record.set_charging(ChargingStatus::NotCharging);
        link.record.set_module_current_a(5.0);

        svc.handle_event(Event::ModuleFault, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Error);
        assert!(svc.recovery_active());
        assert_eq!(link.record.readiness(), Readiness::NotReady);

        // Leak stops: next tick finishes the session but holds in Error.
        link.record.set_module_current_a(0.0);
        svc.poll(&mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Error);
        assert!(!svc.recovery_active());
        assert_eq!(link.record.module_error(), ModuleErrorFlag::CurrentLeak);

        // A benign event unwinds it.
        svc.handle_event(Event::Cool, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Idle);
        assert_eq!(link.record.module_error(), ModuleErrorFlag::None);
        assert_eq!(link.record.readiness(), Readiness::Ready);
        assert!(sink.0.contains(&AppEvent::FaultResolved));
    }

    #[test]
    fn reset_cycle_clears_hardware_fault() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        svc.start(&mut hw, &mut link, &mut sink);
        svc.handle_event(Event::Start, &mut hw, &mut link, &mut sink);

        svc.handle_event(Event::HardwareFault, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Error);
        assert!(!hw.energized);
        assert_eq!(
            link.record.actuator_error(),
            ActuatorErrorFlag::HardwareFault
        );

        // Benign traffic cannot unwind a hardware fault.
        svc.handle_event(Event::Cool, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Error);

        svc.handle_event(Event::Reset, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Reset);
        assert_eq!(link.record.readiness(), Readiness::NotReady);

        svc.handle_event(Event::Complete, &mut hw, &mut link, &mut sink);
        assert_eq!(svc.state(), State::Idle);
        assert_eq!(link.record.readiness(), Readiness::Ready);
        assert_eq!(link.record.actuator_error(), ActuatorErrorFlag::None);
    }

    #[test]
    fn poll_counts_ticks() {
        let (mut svc, mut hw, mut link, mut sink) = harness();
        svc.start(&mut hw, &mut link, &mut sink);
        for _ in 0..5 {
            svc.poll(&mut hw, &mut link, &mut sink);
        }
        assert_eq!(svc.tick_count(), 5);
    }
}
