//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to               |
//! |------------|-------------------|---------------------------|
//! | `hardware` | ActuatorPort      | contactor GPIO            |
//! |            | IndicatorPort     | fault lamp GPIO           |
//! |            | FaultLatchPort    | latch line GPIO           |
//! |            | WatchdogPort      | ESP-IDF task watchdog     |
//! | `link`     | LinkPort          | RS-485 supervisor UART    |
//! | `log_sink` | EventSink         | Serial log output         |

pub mod hardware;
pub mod link;
pub mod log_sink;
