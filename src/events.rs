//! Lock-free event queue between producers and the control loop.
//!
//! Events are produced by:
//! - The serial link (decoded supervisor commands)
//! - The threshold monitor (temperature and leak-current edges)
//! - Driver probes (hardware fault detection)
//!
//! Events are consumed by the main control loop, which feeds them to the
//! [`ControlService`](crate::app::service::ControlService) one at a time
//! in FIFO order.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Serial link RX   │────▶│              │     │              │
//! │ Threshold monitor│────▶│  Event Queue │────▶│  Main Loop   │
//! │ Driver probes    │────▶│  (lock-free) │     │  (consumer)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue carries [`Event`](crate::fsm::Event) discriminant codes so
//! the buffer can stay a flat byte array in a static, reachable from
//! ISR-context producers on the target.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::fsm::Event;

/// Maximum number of pending events.
/// Power of 2 for efficient ring buffer modulo.
const EVENT_QUEUE_CAP: usize = 32;

// ── Lock-free SPSC ring buffer ────────────────────────────────
//
// Producers write, the main loop reads.  Atomic head/tail indices
// enforce the handoff; the buffer lives in a static so ISR callbacks
// can reach it on the target.

static EVENT_HEAD: AtomicU8 = AtomicU8::new(0);
static EVENT_TAIL: AtomicU8 = AtomicU8::new(0);
// SAFETY: EVENT_BUFFER is written only by push_event (single producer
// context) at the head index and read only by pop_event (main loop,
// single consumer) at the tail index.  Head and tail never address the
// same slot while it is live, and the Acquire/Release pairs on the
// indices order the data accesses.
static mut EVENT_BUFFER: [u8; EVENT_QUEUE_CAP] = [0; EVENT_QUEUE_CAP];

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    let head = EVENT_HEAD.load(Ordering::Relaxed);
    let tail = EVENT_TAIL.load(Ordering::Acquire);
    let next_head = (head + 1) % EVENT_QUEUE_CAP as u8;

    if next_head == tail {
        return false; // Queue full — drop event.
    }

    // SAFETY: single producer; the slot at `head` is not visible to the
    // consumer until the Release store below publishes it.
    unsafe {
        EVENT_BUFFER[head as usize] = event.code();
    }

    EVENT_HEAD.store(next_head, Ordering::Release);
    true
}

/// Pop the next event from the queue.
/// Called from the main loop (single consumer).
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);

    if tail == head {
        return None; // Empty.
    }

    // SAFETY: single consumer; the Acquire load of head above ordered
    // this read after the producer's write of the slot.
    let raw = unsafe { EVENT_BUFFER[tail as usize] };
    EVENT_TAIL.store((tail + 1) % EVENT_QUEUE_CAP as u8, Ordering::Release);

    Event::from_code(raw)
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Check if the event queue is empty.
pub fn queue_is_empty() -> bool {
    let tail = EVENT_TAIL.load(Ordering::Relaxed);
    let head = EVENT_HEAD.load(Ordering::Acquire);
    tail == head
}

/// Number of pending events.
pub fn queue_len() -> usize {
    let head = EVENT_HEAD.load(Ordering::Relaxed) as usize;
    let tail = EVENT_TAIL.load(Ordering::Relaxed) as usize;
    (head + EVENT_QUEUE_CAP - tail) % EVENT_QUEUE_CAP
}
