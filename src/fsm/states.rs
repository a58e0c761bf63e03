//! Per-state transition logic — the full state × event table.
//!
//! Each state is one handler function over the event, returning an
//! [`Outcome`]: the optional next state plus the action the service
//! executes.  Every match is exhaustive with no wildcard arm, so adding
//! an event forces every handler to be revisited at compile time.
//!
//! Events not listed as transitioning for a state are *ignored*: the
//! machine stays put but the state's default action still runs (e.g.
//! Idle keeps forcing the contactor off).  Stop is the one exception —
//! it is a transient state whose ignored branch always falls through to
//! Idle after de-energising.

use super::{Event, State};
use crate::status::Readiness;

// ---------------------------------------------------------------------------
// Dispatch result
// ---------------------------------------------------------------------------

/// Action attached to a transition (or to an ignored event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No side effect.
    None,
    /// Energise the contactor.
    ActuatorOn,
    /// De-energise the contactor.
    ActuatorOff,
    /// Enter (or re-enter) fault containment with the triggering event.
    Contain(Event),
}

/// What a dispatch decided: where to go (`None` = stay) and what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub next: Option<State>,
    pub action: Action,
}

impl Outcome {
    const fn stay(action: Action) -> Self {
        Self { next: None, action }
    }

    const fn to(next: State, action: Action) -> Self {
        Self {
            next: Some(next),
            action,
        }
    }
}

// ---------------------------------------------------------------------------
// Readiness policy
// ---------------------------------------------------------------------------

/// Readiness the status record must show for a state.
///
/// `None` for Error: fault containment controls the flag per fault kind
/// there, and a blanket write would clobber it.
pub const fn readiness_policy(state: State) -> Option<Readiness> {
    match state {
        State::Idle | State::Start | State::Cooling | State::Stop => Some(Readiness::Ready),
        State::Reset => Some(Readiness::NotReady),
        State::Error => None,
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Dispatch `event` against `state` and return the decided outcome.
/// Pure — all side effects are executed by the caller.
pub fn handle(state: State, event: Event) -> Outcome {
    match state {
        State::Idle => idle(event),
        State::Start => start(event),
        State::Cooling => cooling(event),
        State::Stop => stop(event),
        State::Error => error(event),
        State::Reset => reset(event),
    }
}

/// Quiescent state: contactor off, waiting for a start command.
fn idle(event: Event) -> Outcome {
    match event {
        Event::CommFault | Event::ModuleFault => Outcome::to(State::Error, Action::Contain(event)),
        Event::Hot => Outcome::to(State::Cooling, Action::ActuatorOn),
        Event::Start => Outcome::to(State::Start, Action::ActuatorOn),
        Event::Stop | Event::HardwareFault | Event::Reset | Event::Cool | Event::Complete => {
            Outcome::stay(Action::ActuatorOff)
        }
    }
}

/// Charging: contactor energised.
fn start(event: Event) -> Outcome {
    match event {
        Event::CommFault | Event::ModuleFault | Event::HardwareFault => {
            Outcome::to(State::Error, Action::Contain(event))
        }
        Event::Hot => Outcome::to(State::Cooling, Action::ActuatorOn),
        Event::Stop => Outcome::to(State::Stop, Action::ActuatorOff),
        Event::Start | Event::Reset | Event::Cool | Event::Complete => {
            Outcome::stay(Action::ActuatorOn)
        }
    }
}

/// Over-temperature mitigation: contactor stays energised to drive the
/// cooling path until the condition completes.
fn cooling(event: Event) -> Outcome {
    match event {
        Event::CommFault | Event::HardwareFault | Event::ModuleFault => {
            Outcome::to(State::Error, Action::Contain(event))
        }
        Event::Start => Outcome::to(State::Start, Action::ActuatorOn),
        Event::Stop => Outcome::to(State::Stop, Action::ActuatorOff),
        Event::Complete => Outcome::to(State::Idle, Action::ActuatorOff),
        Event::Hot | Event::Cool | Event::Reset => Outcome::stay(Action::ActuatorOn),
    }
}

/// Transient state: switch the contactor off, then return to Idle on
/// whatever arrives next — unless it is a containable fault.
fn stop(event: Event) -> Outcome {
    match event {
        Event::CommFault | Event::ModuleFault => Outcome::to(State::Error, Action::Contain(event)),
        Event::Stop
        | Event::Start
        | Event::HardwareFault
        | Event::Reset
        | Event::Cool
        | Event::Hot
        | Event::Complete => Outcome::to(State::Idle, Action::ActuatorOff),
    }
}

/// Fault state: every event except Reset/Complete re-runs containment.
fn error(event: Event) -> Outcome {
    match event {
        Event::Reset => Outcome::to(State::Reset, Action::None),
        Event::Complete => Outcome::to(State::Idle, Action::ActuatorOff),
        Event::Start
        | Event::Stop
        | Event::HardwareFault
        | Event::Cool
        | Event::Hot
        | Event::CommFault
        | Event::ModuleFault => Outcome::stay(Action::Contain(event)),
    }
}

/// Post-fault hold: NotReady until the supervisor drives Complete.
fn reset(event: Event) -> Outcome {
    match event {
        Event::Complete => Outcome::to(State::Idle, Action::ActuatorOff),
        Event::Start
        | Event::Stop
        | Event::Hot
        | Event::Cool
        | Event::CommFault
        | Event::ModuleFault
        | Event::HardwareFault
        | Event::Reset => Outcome::stay(Action::None),
    }
}
