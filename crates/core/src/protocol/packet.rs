//! Telemetry packet codec
//!
//! # Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     sequence_id            u32 little-endian
//! 4       26    sample[0]
//! 30      26    sample[1]
//! 56      26    sample[2]
//!
//! Sample (26 bytes):
//! 0       2     time_offset_ms         u16 little-endian
//! 2       6     sensor A accel x,y,z   i16 big-endian
//! 8       6     sensor A gyro x,y,z    i16 big-endian
//! 14      6     sensor B accel x,y,z   i16 big-endian
//! 20      6     sensor B gyro x,y,z    i16 big-endian
//! ```
//!
//! Header fields are little-endian because the node authors them natively.
//! Sensor triplets stay big-endian because the node copies the MPU-6050
//! register bytes verbatim.
//!
//! A full packet is always 82 bytes. A node configured to flush its partial
//! batch at Stop sends one final short packet of 30 or 56 bytes; every other
//! length is rejected.

use super::cursor::{ByteReader, ByteWriter};
use crate::imu::{InertialSample, SensorFrame};
use core::fmt;
use heapless::Vec;

/// Samples carried by one full packet
pub const SAMPLES_PER_PACKET: usize = 3;

/// Sequence id header size
pub const HEADER_LEN: usize = 4;

/// Encoded size of one sample
pub const SAMPLE_LEN: usize = 26;

/// Encoded size of a full packet
pub const PACKET_LEN: usize = HEADER_LEN + SAMPLES_PER_PACKET * SAMPLE_LEN;

/// Packet decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Length is not `4 + n * 26` for n in 1..=3
    InvalidLength(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidLength(len) => {
                write!(f, "invalid telemetry packet length: {} bytes", len)
            }
        }
    }
}

/// Packet encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Packet holds no samples
    EmptyBatch,
    /// Output buffer cannot hold the encoded packet
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::EmptyBatch => write!(f, "telemetry packet has no samples"),
            EncodeError::BufferTooSmall { needed, available } => write!(
                f,
                "buffer too small: need {} bytes, have {}",
                needed, available
            ),
        }
    }
}

/// One batch of samples with its sequence id
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryPacket {
    /// Monotonic per-session packet counter
    pub sequence_id: u32,
    samples: Vec<InertialSample, SAMPLES_PER_PACKET>,
}

impl TelemetryPacket {
    /// Build a full three-sample packet
    pub fn full(sequence_id: u32, samples: [InertialSample; SAMPLES_PER_PACKET]) -> Self {
        Self {
            sequence_id,
            samples: Vec::from_iter(samples),
        }
    }

    /// Build a packet from up to three samples
    ///
    /// Returns `None` when `samples` is empty or longer than a batch.
    pub fn from_slice(sequence_id: u32, samples: &[InertialSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        Vec::from_slice(samples)
            .ok()
            .map(|samples| Self {
                sequence_id,
                samples,
            })
    }

    pub fn samples(&self) -> &[InertialSample] {
        &self.samples
    }

    /// True for a regular three-sample packet
    pub fn is_full(&self) -> bool {
        self.samples.len() == SAMPLES_PER_PACKET
    }

    /// Encoded size of this packet
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.samples.len() * SAMPLE_LEN
    }

    /// Serialize into `out`, returning the number of bytes written
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, EncodeError> {
        if self.samples.is_empty() {
            return Err(EncodeError::EmptyBatch);
        }
        let needed = self.encoded_len();
        if out.len() < needed {
            return Err(EncodeError::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }

        let mut writer = ByteWriter::new(&mut out[..needed]);
        writer.put_u32_le(self.sequence_id);
        for sample in &self.samples {
            writer.put_u16_le(sample.time_offset_ms);
            writer.put_triplet_be(&sample.sensor_a.accel);
            writer.put_triplet_be(&sample.sensor_a.gyro);
            writer.put_triplet_be(&sample.sensor_b.accel);
            writer.put_triplet_be(&sample.sensor_b.gyro);
        }
        Ok(writer.position())
    }

    /// Serialize into an owned buffer sized for a full packet
    pub fn to_bytes(&self) -> Result<Vec<u8, PACKET_LEN>, EncodeError> {
        let mut buf = [0u8; PACKET_LEN];
        let len = self.encode(&mut buf)?;
        // len <= PACKET_LEN, so the copy cannot overflow
        Vec::from_slice(&buf[..len]).map_err(|_| EncodeError::BufferTooSmall {
            needed: len,
            available: PACKET_LEN,
        })
    }

    /// Parse a notification payload
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let len = bytes.len();
        let body = len.saturating_sub(HEADER_LEN);
        let count = body / SAMPLE_LEN;
        if len < HEADER_LEN + SAMPLE_LEN || body % SAMPLE_LEN != 0 || count > SAMPLES_PER_PACKET
        {
            return Err(DecodeError::InvalidLength(len));
        }

        let mut reader = ByteReader::new(bytes);
        let sequence_id = reader.u32_le();
        let mut samples = Vec::new();
        for _ in 0..count {
            let time_offset_ms = reader.u16_le();
            let sensor_a = SensorFrame {
                accel: reader.triplet_be(),
                gyro: reader.triplet_be(),
            };
            let sensor_b = SensorFrame {
                accel: reader.triplet_be(),
                gyro: reader.triplet_be(),
            };
            // count <= SAMPLES_PER_PACKET was checked above
            let _ = samples.push(InertialSample {
                time_offset_ms,
                sensor_a,
                sensor_b,
            });
        }

        Ok(Self {
            sequence_id,
            samples,
        })
    }
}
