//! Application boundary — port traits and the messages that cross them.
//!
//! The pulse engine ([`pulse`](crate::pulse), [`session`](crate::session))
//! talks to hardware only through the **port traits** defined in
//! [`ports`], keeping it fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
