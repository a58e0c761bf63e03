//! Unified error types for the chargemod firmware.
//!
//! A single `Error` enum that every fallible subsystem converts into,
//! keeping the top-level control loop's error handling uniform.  All
//! variants are `Copy` so they move through the control core without
//! allocation.
//!
//! Fault *containment* (communication/module/hardware faults) is not
//! expressed through this type — those conditions are carried by the
//! shared status record and handled inside [`crate::containment`].
//! [`FaultClass`] is the taxonomy the containment handler dispatches on.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The serial link failed to encode or decode data.
    Link(LinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Serial link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Telemetry frame serialization failed.
    Encode,
    /// Received byte is not a recognised opcode.
    UnknownOpcode(u8),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "frame encode failed"),
            Self::UnknownOpcode(b) => write!(f, "unknown opcode 0x{b:02X}"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Fault taxonomy
// ---------------------------------------------------------------------------

/// Classification of fault events for the containment handler.
///
/// Communication and module faults are retryable on-device; hardware
/// faults are not — they hold the machine in the error state until an
/// external reset arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Supervisor link lost or corrupted; resolution is gated on
    /// observing a recognised charging status again.
    Communication,
    /// Module-side condition (current leak or overheat), recovered by
    /// the containment loops.
    Module,
    /// Hardware defect; requires an explicit external reset.
    Hardware,
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication => write!(f, "communication fault"),
            Self::Module => write!(f, "module fault"),
            Self::Hardware => write!(f, "hardware fault"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
