//! Two-channel digital test pulse generator firmware library.
//!
//! Exposes the pulse engine, validation, and session logic for
//! integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod channel;
pub mod config;
pub mod control;
pub mod error;
pub mod menu;
pub mod pins;
pub mod pulse;
pub mod session;
pub mod validation;

// Hardware-facing modules; host builds use the simulation paths inside.
pub mod adapters;
pub mod drivers;
