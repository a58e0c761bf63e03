//! GPIO / peripheral pin assignments for the charging-module controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Contactor (main actuator, driven through an opto-isolated gate)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = contactor energised.
pub const CONTACTOR_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Fault indicator LED
// ---------------------------------------------------------------------------

/// Digital output: fault indicator (active HIGH).
pub const INDICATOR_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Fault latch
// ---------------------------------------------------------------------------

/// Digital output: level signal latched by the supervisor-side hardware.
/// Driven LOW to clear when a communication fault resolves.
pub const FAULT_LATCH_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// RS485 supervisor link
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const RS485_TX_GPIO: i32 = 17;
#[allow(dead_code)]
pub const RS485_RX_GPIO: i32 = 18;
/// Driver-enable line for the RS485 transceiver (half duplex).
#[allow(dead_code)]
pub const RS485_DE_GPIO: i32 = 19;
