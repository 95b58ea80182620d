//! Shared node context
//!
//! Everything the command handler, sampling task and transport task share
//! lives here and is handed to each task by reference at construction.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use smartpt_core::protocol::service::TRANSPORT_QUEUE_CAPACITY;
use smartpt_core::protocol::TelemetryPacket;
use smartpt_core::session::{NodeAction, NodeConfig, NodeEvent, NodeState, SessionClock};

/// Pipeline counters
///
/// `produced` counts completed batches handed to the queue; each one ends
/// up in exactly one of `published`, `dropped` or `unpublished`.
#[derive(Default)]
pub struct NodeStats {
    produced: AtomicU32,
    dropped: AtomicU32,
    published: AtomicU32,
    unpublished: AtomicU32,
    read_errors: AtomicU32,
}

/// Point-in-time copy of [`NodeStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    pub produced: u32,
    /// Queue full (or discarded at a session restart)
    pub dropped: u32,
    pub published: u32,
    /// Dequeued but not notified (no central, stack refused)
    pub unpublished: u32,
    /// Ticks skipped because a bus read failed
    pub read_errors: u32,
}

impl NodeStats {
    pub const fn new() -> Self {
        Self {
            produced: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            published: AtomicU32::new(0),
            unpublished: AtomicU32::new(0),
            read_errors: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unpublished(&self) {
        self.unpublished.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            unpublished: self.unpublished.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the node's tasks
///
/// Generic over the mutex flavour: `CriticalSectionRawMutex` for a
/// `'static` context on the target, `NoopRawMutex` in single-executor tests.
pub struct NodeContext<M: RawMutex> {
    config: NodeConfig,
    /// Sampler → transport packet queue
    pub(crate) packets: Channel<M, TelemetryPacket, TRANSPORT_QUEUE_CAPACITY>,
    /// Checked by the sampler every tick
    run_gate: AtomicBool,
    /// Raised on every Start; wakes (or restarts) the sampler
    pub(crate) start: Signal<M, ()>,
    /// Raised on every Start; the transport task notifies "ACK"
    pub(crate) ack: Signal<M, ()>,
    state: Mutex<M, Cell<NodeState>>,
    clock: Mutex<M, Cell<Option<SessionClock>>>,
    stats: NodeStats,
}

impl<M: RawMutex> NodeContext<M> {
    pub const fn new(config: NodeConfig) -> Self {
        Self {
            config,
            packets: Channel::new(),
            run_gate: AtomicBool::new(false),
            start: Signal::new(),
            ack: Signal::new(),
            state: Mutex::new(Cell::new(NodeState::Idle)),
            clock: Mutex::new(Cell::new(None)),
            stats: NodeStats::new(),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn state(&self) -> NodeState {
        self.state.lock(|s| s.get())
    }

    /// True while the run gate is open
    pub fn is_running(&self) -> bool {
        self.run_gate.load(Ordering::Acquire)
    }

    /// Anchor of the current (or last) session
    pub fn session_clock(&self) -> Option<SessionClock> {
        self.clock.lock(|c| c.get())
    }

    /// Packets waiting for the transport task
    pub fn queued(&self) -> usize {
        self.packets.len()
    }

    /// Apply an event through the session state machine
    pub(crate) fn transition(&self, event: NodeEvent) -> Option<NodeAction> {
        self.state.lock(|s| {
            let (next, action) = s.get().on(event);
            s.set(next);
            action
        })
    }

    /// Anchor a new session and release the sampler and the ACK
    pub(crate) fn begin_session(&self, now_us: u64) {
        self.clock
            .lock(|c| c.set(Some(SessionClock::anchored_at(now_us))));

        // No packet of the previous session may follow the new ACK
        while self.packets.try_receive().is_ok() {
            self.stats.record_dropped();
        }

        self.run_gate.store(true, Ordering::Release);
        self.ack.signal(());
        self.start.signal(());
    }

    pub(crate) fn end_session(&self) {
        self.run_gate.store(false, Ordering::Release);
    }

    /// Non-blocking enqueue; a full queue drops `packet`
    pub(crate) fn offer(&self, packet: TelemetryPacket) -> bool {
        self.stats.record_produced();
        match self.packets.try_send(packet) {
            Ok(()) => true,
            Err(_) => {
                self.stats.record_dropped();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use smartpt_core::imu::InertialSample;

    fn packet(seq: u32) -> TelemetryPacket {
        TelemetryPacket::full(seq, [InertialSample::default(); 3])
    }

    #[test]
    fn offer_drops_when_full() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        for seq in 0..TRANSPORT_QUEUE_CAPACITY as u32 {
            assert!(ctx.offer(packet(seq)));
        }
        assert!(!ctx.offer(packet(99)));

        let stats = ctx.stats().snapshot();
        assert_eq!(stats.produced, 11);
        assert_eq!(stats.dropped, 1);
        assert_eq!(ctx.queued(), TRANSPORT_QUEUE_CAPACITY);
    }

    #[test]
    fn begin_session_anchors_and_opens_gate() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        assert!(!ctx.is_running());
        assert_eq!(ctx.session_clock(), None);

        ctx.begin_session(2_500_000);
        assert!(ctx.is_running());
        assert_eq!(ctx.session_clock().map(|c| c.anchor_us()), Some(2_500_000));
        assert!(ctx.ack.signaled());
        assert!(ctx.start.signaled());

        ctx.end_session();
        assert!(!ctx.is_running());
    }

    #[test]
    fn begin_session_discards_stale_packets() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        ctx.offer(packet(0));
        ctx.offer(packet(1));
        ctx.begin_session(0);

        assert_eq!(ctx.queued(), 0);
        let stats = ctx.stats().snapshot();
        assert_eq!(stats.produced, 2);
        assert_eq!(stats.dropped, 2);
    }
}
