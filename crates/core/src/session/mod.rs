//! Sensor node session logic
//!
//! Pure building blocks of the node's Idle/Running cycle. The firmware
//! tasks own the concurrency; this module owns the rules:
//!
//! - [`state`]: the single transition function for Start/Stop/Disconnect
//! - [`clock`]: the per-session time anchor and 16-bit offsets
//! - [`batch`]: three-sample packets and sequence ids

pub mod batch;
pub mod clock;
pub mod state;

pub use batch::{BatchAssembler, PartialBatchPolicy};
pub use clock::SessionClock;
pub use state::{NodeAction, NodeEvent, NodeState};

/// Sampling tick period for 100 Hz
pub const DEFAULT_TICK_PERIOD_MS: u32 = 10;

/// Node session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Period between dual-sensor reads
    pub tick_period_ms: u32,
    /// Handling of the incomplete batch at Stop
    pub partial_batch: PartialBatchPolicy,
}

impl NodeConfig {
    pub const fn new() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            partial_batch: PartialBatchPolicy::Discard,
        }
    }

    /// Sampling rate implied by the tick period
    pub const fn sample_rate_hz(&self) -> u32 {
        1000 / self.tick_period_ms
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new()
    }
}
