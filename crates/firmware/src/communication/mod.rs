//! Radio communication
//!
//! The node exposes one GATT service with Status, Ack and Data
//! characteristics (see `smartpt_core::protocol::service`). The BLE stack
//! itself is platform code; tasks only see the [`Notifier`] seam.

pub mod notifier;

pub use notifier::{Notifier, NotifyError};
