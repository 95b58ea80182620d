//! Notification Transport Abstraction
//!
//! This module defines the `Notifier` trait for pushing characteristic
//! notifications to the connected central.
//!
//! # Implementation Notes
//!
//! Each implementation is responsible for:
//! - Tracking whether a central is connected and subscribed
//! - Mapping `Characteristic` to the stack's attribute handles
//! - Reporting stack-level failures as `NotifyError`

use core::fmt;
use smartpt_core::protocol::Characteristic;

/// Notification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// No central connected (or not subscribed)
    NotConnected,
    /// The stack refused the notification (buffers exhausted)
    Rejected,
    /// Payload larger than the negotiated attribute size
    PayloadTooLarge(usize),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::NotConnected => write!(f, "no central connected"),
            NotifyError::Rejected => write!(f, "notification rejected by stack"),
            NotifyError::PayloadTooLarge(len) => {
                write!(f, "notification payload too large: {} bytes", len)
            }
        }
    }
}

/// Characteristic notification sink
///
/// Implement this trait over the platform's BLE stack. The transport task
/// is the only caller.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// True while a central is connected
    fn is_connected(&self) -> bool;

    /// Send `payload` as a notification of `characteristic`
    async fn notify(
        &mut self,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<(), NotifyError>;
}
