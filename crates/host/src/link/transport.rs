use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::HostError;

/// Opaque identifier of a discovered sensor node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(pub String);

/// Inbound traffic from the node, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Value notified on the Ack characteristic
    Ack(Vec<u8>),
    /// Value notified on the Data characteristic
    Data(Vec<u8>),
    /// The link dropped
    Disconnected,
}

/// Radio stack seen by the link client.
///
/// Implementations deliver Ack and Data notifications on a single channel
/// so their relative order is preserved.
#[async_trait]
pub trait LinkTransport: Send {
    /// Find a node advertising `device_name`.
    async fn scan(&mut self, device_name: &str) -> Result<DeviceId, HostError>;

    /// Connect, discover the service and subscribe to Ack and Data.
    async fn connect(
        &mut self,
        device: &DeviceId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<Notification>, HostError>;

    /// Write to the Status characteristic.
    async fn write_status(&mut self, payload: &[u8]) -> Result<(), HostError>;

    async fn disconnect(&mut self) -> Result<(), HostError>;
}
