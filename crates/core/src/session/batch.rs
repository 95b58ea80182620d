//! Three-sample batch assembly and sequence numbering

use crate::imu::InertialSample;
use crate::protocol::packet::{TelemetryPacket, SAMPLES_PER_PACKET};
use heapless::Vec;

/// What to do with an incomplete batch when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PartialBatchPolicy {
    /// Drop the 1–2 pending samples; every packet on the air is full
    #[default]
    Discard,
    /// Send the pending samples as one short final packet
    Flush,
}

/// Collects samples into packets and assigns sequence ids
///
/// Sequence ids start at zero for every session and increase by one per
/// completed batch, whether or not the packet is later dropped by the
/// transport queue. Gaps seen by the host therefore measure loss.
#[derive(Debug, Default)]
pub struct BatchAssembler {
    pending: Vec<InertialSample, SAMPLES_PER_PACKET>,
    next_sequence: u32,
}

impl BatchAssembler {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Forget pending samples and restart numbering at zero
    pub fn reset(&mut self) {
        self.pending.clear();
        self.next_sequence = 0;
    }

    /// Samples waiting for the current batch to complete
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Sequence id the next packet will carry
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Add a sample; returns the packet when this was the third
    pub fn push(&mut self, sample: InertialSample) -> Option<TelemetryPacket> {
        // pending never holds SAMPLES_PER_PACKET samples between calls
        let _ = self.pending.push(sample);
        if self.pending.is_full() {
            self.take_packet()
        } else {
            None
        }
    }

    /// End the session according to `policy`
    pub fn finish(&mut self, policy: PartialBatchPolicy) -> Option<TelemetryPacket> {
        let packet = match policy {
            PartialBatchPolicy::Flush if !self.pending.is_empty() => self.take_packet(),
            _ => None,
        };
        self.pending.clear();
        packet
    }

    fn take_packet(&mut self) -> Option<TelemetryPacket> {
        let packet = TelemetryPacket::from_slice(self.next_sequence, &self.pending)?;
        self.pending.clear();
        self.next_sequence = self.next_sequence.wrapping_add(1);
        Some(packet)
    }
}
