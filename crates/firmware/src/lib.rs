#![cfg_attr(not(test), no_std)]

//! smartpt_firmware - Embassy firmware for the SmartPT sensor node
//!
//! This crate provides the async tasks and device drivers that run on the
//! wearable node, built on the pure session logic in `smartpt_core`.
//!
//! # Design Principles
//!
//! - **Owned context**: tasks share one injected [`tasks::NodeContext`]
//!   instead of module-level singletons
//! - **Never block the sampler**: the only shared resource between the
//!   sampling and transport tasks is a bounded, drop-on-full queue
//! - **Host testable**: bus, radio and tick sources are traits, so the whole
//!   pipeline runs under `cargo test` with mocks

// Logging macros and platform trait adapters
pub mod core;

// Device drivers (dual MPU-6050, failure indicator)
pub mod devices;

// Radio notification seam
pub mod communication;

// Sampling, transport and command tasks
pub mod tasks;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!)
// are exported at crate root via #[macro_export] in core::logging
