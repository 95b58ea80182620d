//! Sampling task
//!
//! Runs at the highest priority. Every tick it reads both sensors, stamps
//! the sample with its offset from the session anchor, and hands each
//! completed three-sample batch to the transport queue without waiting.

use super::context::NodeContext;
use crate::core::traits::Metronome;
use crate::devices::imu::DualImu;
use embassy_sync::blocking_mutex::raw::RawMutex;
use smartpt_core::imu::InertialSample;
use smartpt_core::session::{BatchAssembler, SessionClock};
use smartpt_core::traits::TimeSource;

/// Counts for one Start..Stop session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionSummary {
    /// Samples placed into batches (including a discarded partial batch)
    pub samples: u32,
    /// Packets offered to the queue
    pub packets: u32,
    /// Ticks skipped on a bus error
    pub read_errors: u32,
}

pub struct SamplingTask<'a, M: RawMutex, S, K, T> {
    ctx: &'a NodeContext<M>,
    sensors: S,
    metronome: K,
    time: T,
    batch: BatchAssembler,
}

impl<'a, M, S, K, T> SamplingTask<'a, M, S, K, T>
where
    M: RawMutex,
    S: DualImu,
    K: Metronome,
    T: TimeSource,
{
    pub fn new(ctx: &'a NodeContext<M>, sensors: S, metronome: K, time: T) -> Self {
        Self {
            ctx,
            sensors,
            metronome,
            time,
            batch: BatchAssembler::new(),
        }
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Wait for Start, sample until Stop, repeat
    pub async fn run(&mut self) {
        loop {
            self.ctx.start.wait().await;
            let summary = self.run_session().await;
            crate::log_info!(
                "Session finished: {} samples, {} packets, {} read errors",
                summary.samples,
                summary.packets,
                summary.read_errors
            );
        }
    }

    /// Sample until the run gate closes
    ///
    /// Returns immediately if no session is open. A Start received while
    /// running restarts numbering against the new anchor.
    pub async fn run_session(&mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();
        self.ctx.start.reset();
        self.begin();

        loop {
            self.metronome.next_tick().await;
            if !self.ctx.is_running() {
                break;
            }
            if self.ctx.start.try_take().is_some() {
                crate::log_info!("Session restarted");
                self.begin();
            }
            let Some(clock) = self.ctx.session_clock() else {
                break;
            };
            self.tick(clock, &mut summary).await;
        }

        if let Some(packet) = self.batch.finish(self.ctx.config().partial_batch) {
            crate::log_debug!(
                "Flushing short packet {} ({} samples)",
                packet.sequence_id,
                packet.samples().len()
            );
            self.ctx.offer(packet);
            summary.packets += 1;
        }
        summary
    }

    fn begin(&mut self) {
        self.batch.reset();
        self.metronome.reset();
    }

    async fn tick(&mut self, clock: SessionClock, summary: &mut SessionSummary) {
        let now_us = self.time.now_us();
        let (sensor_a, sensor_b) = match self.sensors.read_pair().await {
            Ok(pair) => pair,
            Err(e) => {
                // Only this slot is lost; the session continues
                crate::log_warn!("Sensor read failed: {:?}", e);
                self.ctx.stats().record_read_error();
                summary.read_errors += 1;
                return;
            }
        };

        // A Start or Stop handled during the read ends the session `clock`
        // belongs to
        if self.ctx.start.try_take().is_some() {
            crate::log_info!("Session restarted during read");
            self.begin();
            return;
        }
        if !self.ctx.is_running() {
            return;
        }

        let sample = InertialSample {
            time_offset_ms: clock.offset_ms(now_us),
            sensor_a,
            sensor_b,
        };
        summary.samples += 1;

        if let Some(packet) = self.batch.push(sample) {
            let sequence_id = packet.sequence_id;
            if !self.ctx.offer(packet) {
                crate::log_warn!("Transport queue full, dropped packet {}", sequence_id);
            }
            summary.packets += 1;
        }
    }
}
