//! Node ⇄ host wire protocol
//!
//! - [`packet`]: the 82-byte telemetry packet on the Data characteristic
//! - [`command`]: Start/Stop writes and the ACK notification
//! - [`service`]: service/characteristic UUIDs and advertising constants
//! - [`cursor`]: explicit-offset, explicit-endianness byte cursors

pub mod command;
pub mod cursor;
pub mod packet;
pub mod service;

pub use command::{is_ack, Command, ACK_PAYLOAD};
pub use packet::{
    DecodeError, EncodeError, TelemetryPacket, HEADER_LEN, PACKET_LEN, SAMPLES_PER_PACKET,
    SAMPLE_LEN,
};
pub use service::Characteristic;
