//! Transport task
//!
//! Lower priority than sampling. Drains the packet queue onto the Data
//! characteristic and sends the ACK on every Start. Nothing here can stall
//! the sampler: the queue is the only coupling and the sampler never waits
//! on it.

use super::context::NodeContext;
use crate::communication::Notifier;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use smartpt_core::protocol::{Characteristic, TelemetryPacket, ACK_PAYLOAD};

/// Work item for the transport task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A Start was accepted; notify "ACK"
    Ack,
    /// A completed batch is ready
    Packet(TelemetryPacket),
}

pub struct TransportTask<'a, M: RawMutex, N> {
    ctx: &'a NodeContext<M>,
    notifier: N,
}

impl<'a, M: RawMutex, N: Notifier> TransportTask<'a, M, N> {
    pub fn new(ctx: &'a NodeContext<M>, notifier: N) -> Self {
        Self { ctx, notifier }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Release the notifier
    pub fn release(self) -> N {
        self.notifier
    }

    /// Serve acknowledgments and packets forever
    pub async fn run(&mut self) {
        loop {
            let event = self.next_event().await;
            self.handle(event).await;
        }
    }

    /// Wait for the next event
    ///
    /// A pending ACK is served before queued packets. Cancel-safe: dropping
    /// the future loses nothing.
    pub async fn next_event(&self) -> TransportEvent {
        match select(self.ctx.ack.wait(), self.ctx.packets.receive()).await {
            Either::First(()) => TransportEvent::Ack,
            Either::Second(packet) => TransportEvent::Packet(packet),
        }
    }

    /// Publish one event
    pub async fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Ack => {
                if self.publish(Characteristic::Ack, ACK_PAYLOAD).await {
                    crate::log_info!("ACK sent");
                }
            }
            TransportEvent::Packet(packet) => self.publish_packet(packet).await,
        }
    }

    /// Publish everything already queued, returning how many packets were taken
    pub async fn drain_pending(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(packet) = self.ctx.packets.try_receive() {
            self.publish_packet(packet).await;
            taken += 1;
        }
        taken
    }

    async fn publish_packet(&mut self, packet: TelemetryPacket) {
        let bytes = match packet.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                crate::log_error!("Cannot encode packet {}: {:?}", packet.sequence_id, e);
                self.ctx.stats().record_unpublished();
                return;
            }
        };

        if self.publish(Characteristic::Data, &bytes).await {
            self.ctx.stats().record_published();
        } else {
            self.ctx.stats().record_unpublished();
        }
    }

    async fn publish(&mut self, characteristic: Characteristic, payload: &[u8]) -> bool {
        if !self.notifier.is_connected() {
            return false;
        }
        match self.notifier.notify(characteristic, payload).await {
            Ok(()) => true,
            Err(e) => {
                crate::log_warn!("Notify {:?} failed: {:?}", characteristic, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::pipeline_tests::MockNotifier;
    use crate::tasks::CommandHandler;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use smartpt_core::imu::InertialSample;
    use smartpt_core::protocol::PACKET_LEN;
    use smartpt_core::session::NodeConfig;

    fn packet(seq: u32) -> TelemetryPacket {
        TelemetryPacket::full(seq, [InertialSample::default(); 3])
    }

    #[tokio::test]
    async fn ack_is_sent_on_start_before_packets() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        let mut transport = TransportTask::new(&ctx, MockNotifier::connected());

        CommandHandler::new(&ctx).on_status_write(b"Start", 0);
        ctx.offer(packet(0));

        let event = transport.next_event().await;
        assert_eq!(event, TransportEvent::Ack);
        transport.handle(event).await;
        let event = transport.next_event().await;
        assert_eq!(event, TransportEvent::Packet(packet(0)));
        transport.handle(event).await;

        let sent = &transport.notifier().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], (Characteristic::Ack, b"ACK".to_vec()));
        assert_eq!(sent[1].0, Characteristic::Data);
        assert_eq!(sent[1].1.len(), PACKET_LEN);
    }

    #[tokio::test]
    async fn disconnected_central_gets_nothing() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        let mut transport = TransportTask::new(&ctx, MockNotifier::disconnected());
        ctx.offer(packet(0));
        ctx.offer(packet(1));

        assert_eq!(transport.drain_pending().await, 2);
        assert!(transport.notifier().sent.is_empty());

        let stats = ctx.stats().snapshot();
        assert_eq!(stats.published, 0);
        assert_eq!(stats.unpublished, 2);
    }

    #[tokio::test]
    async fn rejected_notification_is_counted() {
        let ctx: NodeContext<NoopRawMutex> = NodeContext::new(NodeConfig::new());
        let mut notifier = MockNotifier::connected();
        notifier.reject_next = 1;
        let mut transport = TransportTask::new(&ctx, notifier);
        ctx.offer(packet(0));
        ctx.offer(packet(1));

        transport.drain_pending().await;
        let stats = ctx.stats().snapshot();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.unpublished, 1);
        assert_eq!(transport.notifier().sent.len(), 1);
    }
}
