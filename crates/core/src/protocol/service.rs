//! GATT identity of the sensor node
//!
//! The node exposes one primary service with three characteristics. The
//! host locates the node by advertised name and service UUID.

/// Primary service UUID (16-bit)
pub const SERVICE_UUID: u16 = 0x181C;

/// Status characteristic: write-only, accepts `"Start"` / `"Stop"`
pub const STATUS_CHAR_UUID: u16 = 0x0000;

/// Ack characteristic: read + notify, emits `"ACK"` once per Start
pub const ACK_CHAR_UUID: u16 = 0x0001;

/// Data characteristic: read + notify, one telemetry packet per batch
pub const DATA_CHAR_UUID: u16 = 0x0003;

/// Advertised device name
pub const DEVICE_NAME: &str = "SmartPT_Device";

/// Preferred minimum connection interval (1.25 ms units, 7.5 ms)
pub const PREFERRED_CONN_INTERVAL_MIN: u16 = 0x06;

/// Preferred maximum connection interval (1.25 ms units, 22.5 ms)
pub const PREFERRED_CONN_INTERVAL_MAX: u16 = 0x12;

/// Packets the node buffers between the sampler and the radio
pub const TRANSPORT_QUEUE_CAPACITY: usize = 10;

/// Notifying characteristics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Characteristic {
    Status,
    Ack,
    Data,
}

impl Characteristic {
    pub const fn uuid(self) -> u16 {
        match self {
            Characteristic::Status => STATUS_CHAR_UUID,
            Characteristic::Ack => ACK_CHAR_UUID,
            Characteristic::Data => DATA_CHAR_UUID,
        }
    }

    pub fn from_uuid(uuid: u16) -> Option<Self> {
        match uuid {
            STATUS_CHAR_UUID => Some(Characteristic::Status),
            ACK_CHAR_UUID => Some(Characteristic::Ack),
            DATA_CHAR_UUID => Some(Characteristic::Data),
            _ => None,
        }
    }
}
