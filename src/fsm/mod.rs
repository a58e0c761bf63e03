//! Event-driven finite state machine for the charging module.
//!
//! ```text
//!              Start                    Hot
//!   ┌────────┐ ────► ┌────────┐ ────────────────► ┌─────────┐
//!   │  Idle  │       │ Start  │                   │ Cooling │
//!   └────────┘ ◄──── └────────┘ ◄──────────────── └─────────┘
//!      ▲  ▲     Stop      │          Start             │
//!      │  │     (via      │ CommFault/                 │ Complete
//!      │  │     Stop      │ ModuleFault/               ▼
//!      │  │     state)    │ HardwareFault          (to Idle)
//!      │  │               ▼
//!      │  │ Complete  ┌────────┐  Reset  ┌────────┐
//!      │  └────────── │ Error  │ ──────► │ Reset  │
//!      │              └────────┘         └────────┘
//!      │                                     │
//!      └─────────────────────────────────────┘
//!                      Complete
//! ```
//!
//! The machine itself is a thin shell: [`StateMachine::dispatch`] is a
//! pure table lookup (see [`states`]) and [`StateMachine::apply`]
//! records the move.  All side effects — contactor, indicator, status
//! record, fault containment — live in the service layer, which keeps
//! this module trivially testable.

use log::info;

use crate::error::FaultClass;

pub mod states;

pub use states::{Action, Outcome};

// ---------------------------------------------------------------------------
// States and events
// ---------------------------------------------------------------------------

/// Control states of the charging module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    Idle = 0,
    Start = 1,
    Cooling = 2,
    Stop = 3,
    Error = 4,
    Reset = 5,
}

impl State {
    pub const COUNT: usize = 6;

    /// Wire/telemetry code for this state.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Events the machine consumes.  Sources: supervisor commands over the
/// serial link (Start/Stop/Reset), the threshold monitor (Hot/Cool/
/// ModuleFault), driver probes (CommFault/HardwareFault) and the
/// synthetic Complete injected when a phase finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Event {
    Start = 0,
    Stop = 1,
    Hot = 2,
    Cool = 3,
    CommFault = 4,
    ModuleFault = 5,
    HardwareFault = 6,
    Reset = 7,
    Complete = 8,
}

impl Event {
    pub const COUNT: usize = 9;

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a queue/wire code back into an event.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Start),
            1 => Some(Self::Stop),
            2 => Some(Self::Hot),
            3 => Some(Self::Cool),
            4 => Some(Self::CommFault),
            5 => Some(Self::ModuleFault),
            6 => Some(Self::HardwareFault),
            7 => Some(Self::Reset),
            8 => Some(Self::Complete),
            _ => None,
        }
    }

    /// Which fault family this event raises, if any.
    pub const fn fault_class(self) -> Option<FaultClass> {
        match self {
            Self::CommFault => Some(FaultClass::Communication),
            Self::ModuleFault => Some(FaultClass::Module),
            Self::HardwareFault => Some(FaultClass::Hardware),
            Self::Start
            | Self::Stop
            | Self::Hot
            | Self::Cool
            | Self::Reset
            | Self::Complete => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Current-state holder over the pure transition table.
#[derive(Debug)]
pub struct StateMachine {
    state: State,
}

impl StateMachine {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Look up the outcome for `event` in the current state.  Pure; the
    /// caller executes the action and then calls [`Self::apply`].
    pub fn dispatch(&self, event: Event) -> Outcome {
        states::handle(self.state, event)
    }

    /// Commit a transition decided by [`Self::dispatch`].
    pub fn apply(&mut self, next: State) {
        if next != self.state {
            info!("FSM transition: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_in_idle() {
        let m = StateMachine::new();
        assert_eq!(m.state(), State::Idle);
    }

    #[test]
    fn dispatch_does_not_mutate() {
        let m = StateMachine::new();
        let _ = m.dispatch(Event::Start);
        assert_eq!(m.state(), State::Idle);
    }

    #[test]
    fn apply_commits_transition() {
        let mut m = StateMachine::new();
        let o = m.dispatch(Event::Start);
        m.apply(o.next.unwrap());
        assert_eq!(m.state(), State::Start);
    }

    #[test]
    fn event_codes_round_trip() {
        for code in 0..Event::COUNT as u8 {
            let ev = Event::from_code(code).unwrap();
            assert_eq!(ev.code(), code);
        }
        assert_eq!(Event::from_code(Event::COUNT as u8), None);
        assert_eq!(Event::from_code(u8::MAX), None);
    }

    #[test]
    fn fault_classes_cover_fault_events() {
        assert_eq!(
            Event::CommFault.fault_class(),
            Some(FaultClass::Communication)
        );
        assert_eq!(Event::ModuleFault.fault_class(), Some(FaultClass::Module));
        assert_eq!(
            Event::HardwareFault.fault_class(),
            Some(FaultClass::Hardware)
        );
        assert_eq!(Event::Start.fault_class(), None);
        assert_eq!(Event::Complete.fault_class(), None);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::states::{handle, Action};
    use super::*;

    fn any_state() -> impl Strategy<Value = State> {
        prop_oneof![
            Just(State::Idle),
            Just(State::Start),
            Just(State::Cooling),
            Just(State::Stop),
            Just(State::Error),
            Just(State::Reset),
        ]
    }

    fn any_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Start),
            Just(Event::Stop),
            Just(Event::Hot),
            Just(Event::Cool),
            Just(Event::CommFault),
            Just(Event::ModuleFault),
            Just(Event::HardwareFault),
            Just(Event::Reset),
            Just(Event::Complete),
        ]
    }

    proptest! {
        /// Containment is only ever requested when the machine is in
        /// Error or heading there.
        #[test]
        fn containment_implies_error(state in any_state(), event in any_event()) {
            let o = handle(state, event);
            if matches!(o.action, Action::Contain(_)) {
                let lands_in_error = o.next == Some(State::Error)
                    || (o.next.is_none() && state == State::Error);
                prop_assert!(lands_in_error);
            }
        }

        /// Error is only left via Reset or Complete.
        #[test]
        fn error_exits_are_supervised(event in any_event()) {
            let o = handle(State::Error, event);
            if o.next.is_some() {
                prop_assert!(matches!(event, Event::Reset | Event::Complete));
            }
        }

        /// Reset holds until Complete.
        #[test]
        fn reset_holds_until_complete(event in any_event()) {
            let o = handle(State::Reset, event);
            match event {
                Event::Complete => prop_assert_eq!(o.next, Some(State::Idle)),
                _ => prop_assert_eq!(o.next, None),
            }
        }

        /// A transition decided by dispatch is exactly what apply records.
        #[test]
        fn apply_tracks_dispatch(event in any_event()) {
            let mut m = StateMachine::new();
            let o = m.dispatch(event);
            if let Some(next) = o.next {
                m.apply(next);
                prop_assert_eq!(m.state(), next);
            } else {
                prop_assert_eq!(m.state(), State::Idle);
            }
        }
    }
}
