//! Clock abstraction shared by the node and the host.
//!
//! Session offsets are computed against a [`TimeSource`] so the batching and
//! offset arithmetic run unchanged under a `MockTime` in tests. The Embassy
//! clock adapter lives in the firmware crate behind its `embassy` feature.

pub mod time;

pub use time::{MockTime, TimeSource};
