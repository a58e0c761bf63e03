//! Supervisor serial link adapter.
//!
//! Half-duplex RS-485 link to the charging-station supervisor.
//!
//! Wire format, supervisor → module: bare single-byte opcodes.
//!
//! | Opcode | Meaning                      |
//! |--------|------------------------------|
//! | `S`    | start charging command       |
//! | `P`    | stop charging command        |
//! | `R`    | reset command                |
//! | `C`    | charging status: Charging    |
//! | `N`    | charging status: NotCharging |
//! | `U`    | charging status: Unknown     |
//!
//! Module → supervisor: one status frame per telemetry interval,
//! `[len u8][postcard payload]` (see [`StatusFrame`]).
//!
//! Received bytes land in a fixed ring flanked by two guard words.  A
//! firmware bug or a runaway ISR that overruns the ring clobbers a
//! guard; [`SerialLink::check_overflow_guard`] detects that, resets the
//! ring and restores the guards.  Fault containment runs the check on
//! every communication-fault poll.
//!
//! Command opcodes become [`Event`](crate::fsm::Event)s on the global
//! queue; charging-status opcodes update the owned [`StatusRecord`]
//! directly.  The adapter owns the record because it is the only writer
//! of supervisor-sourced fields.

use log::{error, warn};

use crate::app::ports::LinkPort;
use crate::drivers::hw_init;
use crate::error::{Error, LinkError, Result};
use crate::events;
use crate::fsm::{Event, State};
#[cfg(target_os = "espidf")]
use crate::pins;
use crate::status::{ChargingStatus, StatusFrame, StatusRecord};

/// Receive ring capacity (power of 2).
const RX_RING: usize = 64;

/// Guard word flanking the receive ring on both sides.
const GUARD_WORD: u32 = 0xA5A5_5A5A;

/// Worst-case encoded status frame, prefix included.
const TX_FRAME_MAX: usize = 32;

// ── Command decoding ─────────────────────────────────────────

/// A decoded supervisor opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCommand {
    Start,
    Stop,
    Reset,
    Charging(ChargingStatus),
}

/// Decode one opcode byte.
pub fn decode_opcode(byte: u8) -> core::result::Result<LinkCommand, LinkError> {
    match byte {
        b'S' => Ok(LinkCommand::Start),
        b'P' => Ok(LinkCommand::Stop),
        b'R' => Ok(LinkCommand::Reset),
        b'C' => Ok(LinkCommand::Charging(ChargingStatus::Charging)),
        b'N' => Ok(LinkCommand::Charging(ChargingStatus::NotCharging)),
        b'U' => Ok(LinkCommand::Charging(ChargingStatus::Unknown)),
        other => Err(LinkError::UnknownOpcode(other)),
    }
}

// ── SerialLink ───────────────────────────────────────────────

/// Owns the supervisor link state: RX ring, guards, status record and
/// the telemetry sequence counter.
pub struct SerialLink {
    guard_lo: u32,
    rx_ring: [u8; RX_RING],
    guard_hi: u32,
    rx_head: usize,
    rx_tail: usize,
    record: StatusRecord,
    seq: u32,
    decode_errors: u32,
    dropped_bytes: u32,
}

impl SerialLink {
    pub fn new() -> Self {
        Self {
            guard_lo: GUARD_WORD,
            rx_ring: [0; RX_RING],
            guard_hi: GUARD_WORD,
            rx_head: 0,
            rx_tail: 0,
            record: StatusRecord::default(),
            seq: 0,
            decode_errors: 0,
            dropped_bytes: 0,
        }
    }

    /// Queue one received byte.  Called from the UART pump (target) or
    /// directly by tests (host).  A full ring drops the newest byte.
    pub fn feed_byte(&mut self, byte: u8) {
        let next = (self.rx_head + 1) % RX_RING;
        if next == self.rx_tail {
            self.dropped_bytes = self.dropped_bytes.wrapping_add(1);
            return;
        }
        self.rx_ring[self.rx_head] = byte;
        self.rx_head = next;
    }

    fn pop_byte(&mut self) -> Option<u8> {
        if self.rx_tail == self.rx_head {
            return None;
        }
        let byte = self.rx_ring[self.rx_tail];
        self.rx_tail = (self.rx_tail + 1) % RX_RING;
        Some(byte)
    }

    fn pump_uart(&mut self) {
        while let Some(byte) = hw_init::uart_read_byte() {
            self.feed_byte(byte);
        }
    }

    /// Encode one status frame into `out`: `[len u8][postcard payload]`.
    /// Returns the total number of bytes written.
    pub fn encode_frame(&mut self, state: State, out: &mut [u8]) -> Result<usize> {
        self.seq = self.seq.wrapping_add(1);
        let frame = StatusFrame::capture(self.seq, state, &self.record);
        let (prefix, payload) = out
            .split_first_mut()
            .ok_or(Error::Link(LinkError::Encode))?;
        let used = postcard::to_slice(&frame, payload)
            .map_err(|_| Error::Link(LinkError::Encode))?
            .len();
        *prefix = used as u8;
        Ok(1 + used)
    }

    fn send(&mut self, frame: &[u8]) {
        #[cfg(target_os = "espidf")]
        {
            hw_init::gpio_write(pins::RS485_DE_GPIO, true);
            let written = hw_init::uart_write(frame);
            hw_init::gpio_write(pins::RS485_DE_GPIO, false);
            if written != frame.len() {
                warn!("link: short telemetry write ({written}/{} bytes)", frame.len());
            }
        }
        #[cfg(not(target_os = "espidf"))]
        {
            log::debug!("TELEM frame ({} bytes): {:02x?}", frame.len(), frame);
        }
    }

    /// Opcode decode failures observed so far.
    pub fn decode_errors(&self) -> u32 {
        self.decode_errors
    }

    /// Bytes dropped because the RX ring was full.
    pub fn dropped_bytes(&self) -> u32 {
        self.dropped_bytes
    }

    #[cfg(test)]
    fn corrupt_guard(&mut self) {
        self.guard_hi = 0;
    }
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkPort for SerialLink {
    fn status(&self) -> &StatusRecord {
        &self.record
    }

    fn status_mut(&mut self) -> &mut StatusRecord {
        &mut self.record
    }

    fn service(&mut self) {
        self.pump_uart();
        while let Some(byte) = self.pop_byte() {
            let event = match decode_opcode(byte) {
                Ok(LinkCommand::Start) => Some(Event::Start),
                Ok(LinkCommand::Stop) => Some(Event::Stop),
                Ok(LinkCommand::Reset) => Some(Event::Reset),
                Ok(LinkCommand::Charging(status)) => {
                    self.record.set_charging(status);
                    None
                }
                Err(err) => {
                    self.decode_errors = self.decode_errors.wrapping_add(1);
                    warn!("link: {err}");
                    None
                }
            };
            if let Some(event) = event {
                if !events::push_event(event) {
                    warn!("event queue full, dropping {event:?} command");
                }
            }
        }
    }

    fn transmit(&mut self, state: State) {
        let mut buf = [0u8; TX_FRAME_MAX];
        match self.encode_frame(state, &mut buf) {
            Ok(total) => self.send(&buf[..total]),
            Err(err) => error!("telemetry encode failed: {err}"),
        }
    }

    fn check_overflow_guard(&mut self) -> bool {
        let intact = self.guard_lo == GUARD_WORD && self.guard_hi == GUARD_WORD;
        if !intact {
            error!(
                "rx ring guard clobbered (lo={:#010x} hi={:#010x}), resetting ring",
                self.guard_lo, self.guard_hi
            );
            self.guard_lo = GUARD_WORD;
            self.guard_hi = GUARD_WORD;
            self.rx_head = 0;
            self.rx_tail = 0;
        }
        intact
    }
}

// ── Tests ────────────────────────────────────────────────────
//
// Command opcodes push onto the process-global event queue, so tests
// here stick to charging-status and invalid bytes; queue-visible
// behaviour is covered by the integration suite.
