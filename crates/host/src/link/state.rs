//! Host link state machine
//!
//! ```text
//! Disconnected ──ScanStarted──▶ Scanning ──DeviceFound──▶ Connecting
//!      ▲                          │                          │
//!      └────────ScanFailed────────┘          Established     │ ConnectFailed
//!      ▲                                          ▼          ▼
//!      └──────────LinkLost (from any)──── Connected ◀──▶ Recording
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    ScanStarted,
    DeviceFound,
    ScanFailed,
    Established,
    ConnectFailed,
    RecordingStarted,
    RecordingStopped,
    /// Link dropped or was closed by the host
    LinkLost,
}

/// An event that is not legal in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not valid while {from:?}")]
pub struct InvalidTransition {
    pub from: LinkState,
    pub event: LinkEvent,
}

impl LinkState {
    pub fn transition(self, event: LinkEvent) -> Result<LinkState, InvalidTransition> {
        use LinkEvent as E;
        use LinkState as S;

        let next = match (self, event) {
            (_, E::LinkLost) => S::Disconnected,
            (S::Disconnected, E::ScanStarted) => S::Scanning,
            (S::Scanning, E::DeviceFound) => S::Connecting,
            (S::Scanning, E::ScanFailed) => S::Disconnected,
            (S::Connecting, E::Established) => S::Connected,
            (S::Connecting, E::ConnectFailed) => S::Disconnected,
            (S::Connected, E::RecordingStarted) => S::Recording,
            (S::Recording, E::RecordingStopped) => S::Connected,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }

    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected | LinkState::Recording)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Scanning => "scanning",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Recording => "recording",
        };
        f.write_str(name)
    }
}
