//! Platform trait adapters for the sensor node.
//!
//! `TimeSource` comes from `smartpt_core`; this module adds the periodic
//! tick abstraction the sampling task waits on, plus the Embassy-backed
//! implementations of both (behind the `embassy` feature).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  SamplingTask                        │
//! │          waits on Metronome, reads TimeSource        │
//! │                        │                             │
//! │          ┌─────────────┴──────────────┐              │
//! │          ▼                            ▼              │
//! │  ┌──────────────────────┐  ┌─────────────────────┐  │
//! │  │ Embassy Impl         │  │ Test Impl           │  │
//! │  │ EmbassyTicker,       │  │ step metronome,     │  │
//! │  │ EmbassyClock         │  │ MockTime            │  │
//! │  └──────────────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod time;

pub use smartpt_core::traits::{MockTime, TimeSource};
pub use time::Metronome;
#[cfg(feature = "embassy")]
pub use time::{EmbassyClock, EmbassyTicker};
