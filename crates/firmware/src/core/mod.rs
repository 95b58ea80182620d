//! Firmware infrastructure
//!
//! Logging macros and the trait adapters that bind `smartpt_core`
//! abstractions to Embassy on the target.

pub mod logging;
pub mod traits;
