//! Session recording
//!
//! Rebuilds the sample stream of one session from Data notifications:
//!
//! - the first expected sequence id is 0; a jump counts the missing ids as
//!   dropped packets
//! - an id below the expected one (duplicate or late) is counted as out of
//!   order and its samples are not appended
//! - the 16-bit offsets are extended across the 65.536 s rollover, then the
//!   clock offset is added to give milliseconds since the host sent Start

use std::time::Duration;

use smartpt_core::imu::PhysicalSample;
use smartpt_core::protocol::{DecodeError, TelemetryPacket};

/// Node-to-host clock correction, half the Start/ACK round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockOffset {
    ms: u32,
}

impl ClockOffset {
    pub const ZERO: ClockOffset = ClockOffset { ms: 0 };

    pub fn from_rtt(rtt: Duration) -> Self {
        let half = rtt.as_millis() / 2;
        Self {
            ms: half.min(u32::MAX as u128) as u32,
        }
    }

    pub fn from_ms(ms: u32) -> Self {
        Self { ms }
    }

    pub fn as_ms(self) -> u32 {
        self.ms
    }
}

/// What happened to one Data notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Samples appended to the buffer
    Appended(usize),
    /// Sequence id was below the expected one
    OutOfOrder,
    /// No session is being recorded
    Ignored,
}

/// Extends 16-bit session offsets to 32 bits
#[derive(Debug, Clone, Copy, Default)]
struct OffsetUnwrapper {
    last: Option<u16>,
    epoch: u32,
}

impl OffsetUnwrapper {
    fn extend(&mut self, raw: u16) -> u32 {
        if let Some(last) = self.last {
            // Offsets only move forward; a backward step of more than half
            // the range is a rollover
            if raw < last && last - raw > u16::MAX / 2 {
                self.epoch += 1;
            }
        }
        self.last = Some(raw);
        self.epoch * 65_536 + raw as u32
    }
}

/// Copy of the recorded session handed to callers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingSnapshot {
    pub samples: Vec<PhysicalSample>,
    pub clock_offset: ClockOffset,
    /// `false` when recording continued after an ACK timeout
    pub synchronized: bool,
    /// `false` when the link dropped before Stop
    pub complete: bool,
    /// Host wall clock when Start was written, UTC milliseconds
    pub started_at_utc_ms: Option<i64>,
    pub packets_received: u64,
    pub dropped_packets: u64,
    pub out_of_order_packets: u64,
    pub decode_errors: u64,
}

#[derive(Debug, Default)]
pub struct SessionRecorder {
    snapshot: RecordingSnapshot,
    recording: bool,
    next_expected: u32,
    offsets: OffsetUnwrapper,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the buffer and counters for a new session
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start accepting packets
    pub fn begin(&mut self, clock_offset: ClockOffset, synchronized: bool, started_at_utc_ms: i64) {
        self.reset();
        self.snapshot.clock_offset = clock_offset;
        self.snapshot.synchronized = synchronized;
        self.snapshot.started_at_utc_ms = Some(started_at_utc_ms);
        self.recording = true;
    }

    /// Stop normally; the buffer is kept
    pub fn finish(&mut self) {
        if self.recording {
            self.recording = false;
            self.snapshot.complete = true;
        }
    }

    /// The link dropped; the buffer is kept and marked incomplete
    pub fn interrupt(&mut self) {
        if self.recording {
            self.recording = false;
            self.snapshot.complete = false;
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn clock_offset(&self) -> ClockOffset {
        self.snapshot.clock_offset
    }

    pub fn snapshot(&self) -> &RecordingSnapshot {
        &self.snapshot
    }

    /// Decode one Data notification and append its samples
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<IngestOutcome, DecodeError> {
        if !self.recording {
            return Ok(IngestOutcome::Ignored);
        }
        let packet = match TelemetryPacket::decode(bytes) {
            Ok(packet) => packet,
            Err(e) => {
                self.snapshot.decode_errors += 1;
                return Err(e);
            }
        };
        self.snapshot.packets_received += 1;

        let id = packet.sequence_id;
        if id < self.next_expected {
            self.snapshot.out_of_order_packets += 1;
            return Ok(IngestOutcome::OutOfOrder);
        }
        self.snapshot.dropped_packets += (id - self.next_expected) as u64;
        self.next_expected = id.wrapping_add(1);

        let offset_ms = self.snapshot.clock_offset.as_ms();
        for sample in packet.samples() {
            let elapsed = self.offsets.extend(sample.time_offset_ms);
            self.snapshot
                .samples
                .push(PhysicalSample::from_raw(sample, elapsed.saturating_add(offset_ms)));
        }
        Ok(IngestOutcome::Appended(packet.samples().len()))
    }
}
