//! Whole-node pipeline tests: command handler, sampler, queue and
//! transport running together on one executor with mock hardware.

use super::{
    CommandHandler, NodeContext, SamplingTask, SessionSummary, StatsSnapshot, TransportTask,
};
use crate::communication::{Notifier, NotifyError};
use crate::core::traits::Metronome;
use crate::devices::imu::{DualMpu6050, MockBus};
use embassy_futures::join::join;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use smartpt_core::imu::{SensorFrame, SensorId};
use smartpt_core::protocol::{Characteristic, TelemetryPacket};
use smartpt_core::session::{NodeConfig, PartialBatchPolicy};
use smartpt_core::traits::{MockTime, TimeSource};
use std::vec::Vec;

/// Notifier that records every notification
pub(crate) struct MockNotifier {
    connected: bool,
    pub sent: Vec<(Characteristic, Vec<u8>)>,
    /// Fail this many upcoming notifications with `Rejected`
    pub reject_next: usize,
    /// Executor polls each notification takes to complete
    pub latency_polls: usize,
}

impl MockNotifier {
    pub fn connected() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
            reject_next: 0,
            latency_polls: 0,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::connected()
        }
    }

    pub fn data_packets(&self) -> Vec<TelemetryPacket> {
        self.sent
            .iter()
            .filter(|(c, _)| *c == Characteristic::Data)
            .map(|(_, bytes)| TelemetryPacket::decode(bytes).unwrap())
            .collect()
    }
}

impl Notifier for MockNotifier {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn notify(
        &mut self,
        characteristic: Characteristic,
        payload: &[u8],
    ) -> Result<(), NotifyError> {
        for _ in 0..self.latency_polls {
            yield_now().await;
        }
        if self.reject_next > 0 {
            self.reject_next -= 1;
            return Err(NotifyError::Rejected);
        }
        self.sent.push((characteristic, payload.to_vec()));
        Ok(())
    }
}

/// Tick source that advances a shared `MockTime` by one period per tick
/// and writes "Stop" once `ticks` ticks have elapsed
pub(crate) struct StepMetronome<'a, M: RawMutex> {
    ctx: &'a NodeContext<M>,
    time: &'a MockTime,
    period_us: u64,
    remaining: u32,
}

impl<'a, M: RawMutex> StepMetronome<'a, M> {
    pub fn new(ctx: &'a NodeContext<M>, time: &'a MockTime, period_us: u64, ticks: u32) -> Self {
        Self {
            ctx,
            time,
            period_us,
            remaining: ticks,
        }
    }
}

impl<M: RawMutex> Metronome for StepMetronome<'_, M> {
    async fn next_tick(&mut self) {
        // Let the transport side run between ticks
        yield_now().await;
        if self.remaining == 0 {
            CommandHandler::new(self.ctx).on_status_write(b"Stop", self.time.now_us());
            return;
        }
        self.remaining -= 1;
        self.time.advance(self.period_us);
    }

    fn reset(&mut self) {}
}

/// Bus with both sensors reporting plausible resting data
pub(crate) fn live_bus() -> MockBus {
    let mut bus = MockBus::new();
    bus.set_frame(
        SensorId::A,
        SensorFrame {
            accel: [12, -40, 16384],
            gyro: [3, -2, 1],
        },
    );
    bus.set_frame(
        SensorId::B,
        SensorFrame {
            accel: [-16384, 8, 30],
            gyro: [-131, 0, 262],
        },
    );
    bus
}

type TestSampler<'a> = SamplingTask<
    'a,
    NoopRawMutex,
    DualMpu6050<MockBus>,
    StepMetronome<'a, NoopRawMutex>,
    &'a MockTime,
>;

/// Run one session with sampler and transport concurrent, then drain
async fn run_pipeline<N: Notifier>(
    sampler: &mut TestSampler<'_>,
    transport: &mut TransportTask<'_, NoopRawMutex, N>,
) -> SessionSummary {
    let done: Signal<NoopRawMutex, ()> = Signal::new();

    let producer = async {
        let summary = sampler.run_session().await;
        done.signal(());
        summary
    };
    let consumer = async {
        loop {
            let next = select(transport.next_event(), done.wait()).await;
            match next {
                Either::First(event) => transport.handle(event).await,
                Either::Second(()) => break,
            }
        }
        transport.drain_pending().await;
    };

    let (summary, ()) = join(producer, consumer).await;
    summary
}

struct SessionOutcome {
    stats: StatsSnapshot,
    summary: SessionSummary,
    notifier: MockNotifier,
}

async fn five_second_session(policy: PartialBatchPolicy) -> SessionOutcome {
    let config = NodeConfig {
        partial_batch: policy,
        ..NodeConfig::new()
    };
    let ctx: NodeContext<NoopRawMutex> = NodeContext::new(config);
    let time = MockTime::with_initial(3_000_000);

    let mut sensors = DualMpu6050::new(live_bus());
    sensors.self_test().await.unwrap();

    CommandHandler::new(&ctx).on_status_write(b"Start", time.now_us());
    let metronome = StepMetronome::new(&ctx, &time, 10_000, 500);
    let mut sampler = SamplingTask::new(&ctx, sensors, metronome, &time);
    let mut transport = TransportTask::new(&ctx, MockNotifier::connected());

    let summary = run_pipeline(&mut sampler, &mut transport).await;
    SessionOutcome {
        stats: ctx.stats().snapshot(),
        summary,
        notifier: transport.release(),
    }
}

#[tokio::test]
async fn five_seconds_at_100hz_with_flush() {
    let outcome = five_second_session(PartialBatchPolicy::Flush).await;
    let packets = outcome.notifier.data_packets();

    assert_eq!(outcome.summary.samples, 500);
    assert_eq!(packets.len(), 167);
    let ids: Vec<u32> = packets.iter().map(|p| p.sequence_id).collect();
    assert_eq!(ids, (0..167).collect::<Vec<u32>>());
    let samples: usize = packets.iter().map(|p| p.samples().len()).sum();
    assert_eq!(samples, 500);
    assert_eq!(packets[166].samples().len(), 2);
    assert_eq!(packets[166].samples()[1].time_offset_ms, 5000);

    assert_eq!(outcome.notifier.sent[0].0, Characteristic::Ack);
    assert_eq!(outcome.stats.dropped, 0);
    assert_eq!(outcome.stats.published, 167);
}

#[tokio::test]
async fn five_seconds_at_100hz_with_discard() {
    let outcome = five_second_session(PartialBatchPolicy::Discard).await;
    let packets = outcome.notifier.data_packets();

    assert_eq!(outcome.summary.samples, 500);
    assert_eq!(packets.len(), 166);
    assert!(packets.iter().all(|p| p.is_full()));
    assert_eq!(packets.last().map(|p| p.sequence_id), Some(165));
    assert_eq!(outcome.stats.dropped, 0);
}

#[tokio::test]
async fn saturated_queue_accounts_for_every_packet() {
    let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
    let time = MockTime::new();
    let mut sensors = DualMpu6050::new(live_bus());
    sensors.wake_all().await.unwrap();

    CommandHandler::new(&ctx).on_status_write(b"Start", 0);
    let metronome = StepMetronome::new(&ctx, &time, 10_000, 300);
    let mut sampler = SamplingTask::new(&ctx, sensors, metronome, &time);
    let mut notifier = MockNotifier::connected();
    notifier.latency_polls = 10;
    let mut transport = TransportTask::new(&ctx, notifier);

    let summary = run_pipeline(&mut sampler, &mut transport).await;
    assert_eq!(summary.packets, 100);

    let stats = ctx.stats().snapshot();
    assert_eq!(stats.produced, 100);
    assert!(stats.dropped > 0);
    assert!(stats.published > 0);
    assert_eq!(stats.unpublished, 0);
    assert_eq!(stats.produced, stats.published + stats.dropped);

    // Every id missing on the air is a dropped packet
    let ids: Vec<u32> = transport
        .notifier()
        .data_packets()
        .iter()
        .map(|p| p.sequence_id)
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ids.len() as u32 + stats.dropped, 100);
}
