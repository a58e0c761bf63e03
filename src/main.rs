//! Charging-Module Controller — Main Entry Point
//!
//! Hexagonal architecture with an event-driven control core.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              SerialLink        LogEventSink   │
//! │  (Actuator+Indicator          (RS-485 link      (EventSink)    │
//! │   +FaultLatch+Watchdog)        to supervisor)                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             ControlService (pure logic)                │    │
//! │  │  FSM · Fault containment                               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ThresholdMonitor (edge detection) · Event queue (SPSC ring)   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod containment;
pub mod error;
mod events;
mod monitor;
mod pins;
pub mod status;

pub mod app;
mod adapters;
mod drivers;
pub mod fsm;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::link::SerialLink;
use adapters::log_sink::LogEventSink;
use app::ports::{LinkPort, WatchdogPort};
use app::service::ControlService;
use config::ModuleConfig;
use drivers::contactor::Contactor;
use drivers::fault_latch::FaultLatch;
use drivers::indicator::Indicator;
use drivers::watchdog::Watchdog;
use monitor::ThresholdMonitor;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  ChargeMod v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Validate configuration ─────────────────────────────
    let config = ModuleConfig::default();
    config.validate()?;

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(
        Contactor::new(),
        Indicator::new(),
        FaultLatch::new(),
        Watchdog::new(),
    );
    let mut link = SerialLink::new();
    let mut log_sink = LogEventSink::new();
    let mut monitor = ThresholdMonitor::new(&config);

    // ── 5. Construct control service ──────────────────────────
    let mut svc = ControlService::new(config.clone());
    svc.start(&mut hw, &mut link, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let ticks_per_telemetry =
        (config.telemetry_interval_secs as u64 * 1000) / config.control_loop_interval_ms as u64;
    let mut telemetry_counter: u64 = 0;

    loop {
        // std::thread::sleep maps to vTaskDelay under ESP-IDF, so the
        // loop yields to FreeRTOS between passes.
        std::thread::sleep(std::time::Duration::from_millis(
            config.control_loop_interval_ms as u64,
        ));

        // Pull supervisor bytes: decoded commands land in the event
        // queue, charging-status updates land in the status record.
        link.service();

        // Threshold crossings become edge events.
        for event in monitor.evaluate(link.status()) {
            if !events::push_event(event) {
                warn!("event queue full, dropping {:?}", event);
            }
        }

        // Process all pending events.
        events::drain_events(|event| {
            svc.handle_event(event, &mut hw, &mut link, &mut log_sink);
        });

        // One fault-recovery iteration per pass while containment is active.
        svc.poll(&mut hw, &mut link, &mut log_sink);

        // Advance the indicator blink phase.
        hw.tick_indicator(config.control_loop_interval_ms);

        // Periodic status frame to the supervisor.
        telemetry_counter += 1;
        if telemetry_counter >= ticks_per_telemetry {
            link.transmit(svc.state());
            log::debug!(
                "link health: {} decode errors, {} dropped bytes",
                link.decode_errors(),
                link.dropped_bytes()
            );
            telemetry_counter = 0;
        }

        // Refresh watchdog on every iteration.
        hw.refresh();
    }
}
