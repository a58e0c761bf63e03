//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, fold into
//! a telemetry frame, or drop them.

use crate::error::FaultClass;
use crate::fsm::State;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The control service has started (carries initial state).
    Started(State),

    /// The state machine transitioned between states.
    StateChanged { from: State, to: State },

    /// A fault was raised and containment engaged.
    FaultRaised(FaultClass),

    /// A containment session completed and the fault indication cleared.
    FaultResolved,
}
