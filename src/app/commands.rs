//! Inbound operator commands during a firing session.
//!
//! Keystrokes read by the [`SessionMonitor`](crate::session::SessionMonitor)
//! are decoded into these before being broadcast through the control state.

/// Commands the operator can issue while pulses are firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Pause every channel, or resume them if already paused.
    TogglePause,

    /// Stop every channel and end the session.
    Stop,
}

impl OperatorCommand {
    /// Decode one keystroke.  Unknown keys yield `None`.
    pub fn from_key(key: u8) -> Option<Self> {
        match key.to_ascii_uppercase() {
            b'P' => Some(Self::TogglePause),
            b'X' => Some(Self::Stop),
            _ => None,
        }
    }
}
