//! Pulse Generator Firmware — Main Entry Point
//!
//! Hexagonal architecture with one pinned task per output line.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LineAdapter   Esp32TimeAdapter   HardwareRng   LogEventSink   │
//! │  (OutputPort)  (Clock)            (Random)      (EventSink)    │
//! │  UartConsole (ConsolePort)        HardwareIo (IoFactory)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  menu ─▶ SessionMonitor ─▶ PulseScheduler × N          │    │
//! │  │          ControlState (stop flag · pause toggle)       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The main task loops forever: configure, wait for `S`, fire until every
//! channel has stopped, report, start over.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};

use pulsegen::adapters::console::UartConsole;
use pulsegen::adapters::hardware::HardwareIo;
use pulsegen::adapters::time::Esp32TimeAdapter;
use pulsegen::config::TimingConfig;
use pulsegen::control::ControlState;
use pulsegen::drivers::hw_init;
use pulsegen::menu;
use pulsegen::session::{SessionMonitor, report_json};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    log::set_max_level(log::LevelFilter::Info);

    info!("╔══════════════════════════════════════╗");
    info!("║  PulseGen v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Operator console ───────────────────────────────────
    hw_init::init_console_uart()?;
    let mut console = UartConsole::new();

    let clock = Esp32TimeAdapter::new();
    let mut io = HardwareIo::new(clock);
    let control = Arc::new(ControlState::new());

    // ── 3. Session loop ───────────────────────────────────────
    loop {
        control.reset();

        let specs = match menu::configure_session(&mut console) {
            Ok(specs) => specs,
            Err(e) => {
                warn!("MENU | configuration rejected: {}", e);
                continue;
            }
        };
        menu::print_summary(&mut console, &specs);

        // ── 3a. Output lines idle HIGH before anything fires ──
        let mut lines_ok = true;
        for spec in &specs {
            if let Err(e) = hw_init::init_output_line(spec.line().gpio()) {
                error!("{}: {}", spec.line(), e);
                lines_ok = false;
            }
        }
        if !lines_ok {
            continue;
        }

        menu::wait_for_start(&mut console);

        // ── 3b. Fire ──────────────────────────────────────────
        let mut session =
            match SessionMonitor::new(Arc::clone(&control), specs, TimingConfig::default(), clock) {
                Ok(session) => session,
                Err(e) => {
                    error!("SESSION | {}", e);
                    continue;
                }
            };
        if let Err(e) = session.start(&mut io) {
            error!("SESSION | start failed: {}", e);
            continue;
        }
        let report = session.run(&mut console);

        // ── 3c. Report ────────────────────────────────────────
        match report_json(&report) {
            Ok(json) => info!("REPORT | {}", json),
            Err(e) => warn!("REPORT | serialisation failed: {}", e),
        }
    }
}
