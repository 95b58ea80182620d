use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use smartpt_core::imu::{InertialSample, SensorFrame};
use smartpt_core::protocol::TelemetryPacket;
use smartpt_host::{
    DeviceId, HostConfig, HostError, LinkClient, LinkState, LinkTransport, Notification,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

/// Node side of the mock link, shared with the test body.
#[derive(Default)]
struct NodeSide {
    notifications: Option<mpsc::Sender<Notification>>,
    writes: Vec<Vec<u8>>,
    /// Sent this long after every Start write
    on_start: Option<(Duration, Notification)>,
    fail_scan: bool,
}

#[derive(Clone, Default)]
struct NodeHandle(Arc<Mutex<NodeSide>>);

impl NodeHandle {
    fn acking_after(delay_ms: u64) -> Self {
        let handle = Self::default();
        handle.0.lock().unwrap().on_start = Some((
            Duration::from_millis(delay_ms),
            Notification::Ack(b"ACK".to_vec()),
        ));
        handle
    }

    async fn send(&self, notification: Notification) {
        let tx = self.0.lock().unwrap().notifications.clone().unwrap();
        tx.send(notification).await.unwrap();
    }

    async fn send_packet(&self, id: u32, offsets: [u16; 3]) {
        let samples = offsets.map(|time_offset_ms| InertialSample {
            time_offset_ms,
            sensor_a: SensorFrame {
                accel: [0, 0, 16384],
                gyro: [0, 0, 131],
            },
            sensor_b: SensorFrame::default(),
        });
        let bytes = TelemetryPacket::full(id, samples).to_bytes().unwrap();
        self.send(Notification::Data(bytes.to_vec())).await;
    }

    fn writes(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().writes.clone()
    }
}

struct MockTransport {
    node: NodeHandle,
}

#[async_trait]
impl LinkTransport for MockTransport {
    async fn scan(&mut self, device_name: &str) -> Result<DeviceId, HostError> {
        if self.node.0.lock().unwrap().fail_scan {
            return Err(HostError::Transport("no device found".into()));
        }
        Ok(DeviceId(format!("{device_name}@mock")))
    }

    async fn connect(
        &mut self,
        _device: &DeviceId,
        buffer: usize,
    ) -> Result<mpsc::Receiver<Notification>, HostError> {
        let (tx, rx) = mpsc::channel(buffer);
        self.node.0.lock().unwrap().notifications = Some(tx);
        Ok(rx)
    }

    async fn write_status(&mut self, payload: &[u8]) -> Result<(), HostError> {
        let mut node = self.node.0.lock().unwrap();
        node.writes.push(payload.to_vec());
        if payload == b"Start" {
            if let (Some((delay, notification)), Some(tx)) =
                (node.on_start.clone(), node.notifications.clone())
            {
                tokio::spawn(async move {
                    sleep(delay).await;
                    let _ = tx.send(notification).await;
                });
            }
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), HostError> {
        self.node.0.lock().unwrap().notifications = None;
        Ok(())
    }
}

async fn connected_client(node: &NodeHandle) -> LinkClient<MockTransport> {
    let mut client = LinkClient::new(
        MockTransport { node: node.clone() },
        HostConfig::default(),
    );
    client.connect().await.unwrap();
    assert_eq!(client.state(), LinkState::Connected);
    client
}

/// Let the dispatcher drain what has been sent
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn offset_is_half_the_ack_round_trip() {
    let node = NodeHandle::acking_after(40);
    let mut client = connected_client(&node).await;

    let offset = client.start_recording().await.unwrap();
    assert_eq!(offset.as_ms(), 20);
    assert_eq!(client.state(), LinkState::Recording);

    node.send_packet(0, [100, 110, 120]).await;
    settle().await;

    let snapshot = client.recording();
    let stamps: Vec<u32> = snapshot.samples.iter().map(|s| s.timestamp_ms).collect();
    assert_eq!(stamps, vec![120, 130, 140]);
    assert!(snapshot.synchronized);
    assert_eq!(snapshot.samples[0].sensor_a.gyro_dps[2], 1.0);
}

#[tokio::test(start_paused = true)]
async fn missing_ack_times_out_and_allows_degraded_mode() {
    let node = NodeHandle::default();
    let mut client = connected_client(&node).await;

    let started = Instant::now();
    let err = client.start_recording().await.unwrap_err();
    assert!(matches!(err, HostError::AckTimeout(5000)));
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(client.state(), LinkState::Connected);

    client.accept_unsynchronized().unwrap();
    assert_eq!(client.state(), LinkState::Recording);
    node.send_packet(0, [100, 110, 120]).await;
    settle().await;

    let snapshot = client.recording();
    assert!(!snapshot.synchronized);
    assert_eq!(snapshot.samples[0].timestamp_ms, 100);
}

fn utc_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

// Real time: the session start is read from the wall clock
#[tokio::test]
async fn degraded_mode_keeps_the_start_write_time() {
    let node = NodeHandle::default();
    let config = HostConfig {
        ack_timeout_ms: 300,
        ..HostConfig::default()
    };
    let mut client = LinkClient::new(MockTransport { node: node.clone() }, config);
    client.connect().await.unwrap();

    let written_at = utc_now_ms();
    assert!(matches!(
        client.start_recording().await,
        Err(HostError::AckTimeout(300))
    ));
    client.accept_unsynchronized().unwrap();

    let started_at = client.recording().started_at_utc_ms.unwrap();
    assert!(
        (started_at - written_at).abs() < 100,
        "session start {started_at} should match the Start write at {written_at}"
    );
    assert!(utc_now_ms() - started_at >= 250);
}

#[tokio::test(start_paused = true)]
async fn start_requires_a_connection() {
    let node = NodeHandle::acking_after(10);
    let mut client = LinkClient::new(MockTransport { node: node.clone() }, HostConfig::default());

    assert!(matches!(
        client.start_recording().await,
        Err(HostError::NotConnected)
    ));
    assert!(matches!(
        client.stop_recording().await,
        Err(HostError::NotRecording)
    ));
    assert!(node.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_start_while_recording_is_rejected() {
    let node = NodeHandle::acking_after(10);
    let mut client = connected_client(&node).await;
    client.start_recording().await.unwrap();

    assert!(matches!(
        client.start_recording().await,
        Err(HostError::AlreadyRecording)
    ));
    assert_eq!(node.writes(), vec![b"Start".to_vec()]);
}

#[tokio::test(start_paused = true)]
async fn disconnect_during_recording_keeps_partial_buffer() {
    let node = NodeHandle::acking_after(10);
    let mut client = connected_client(&node).await;
    client.start_recording().await.unwrap();

    node.send_packet(0, [10, 20, 30]).await;
    node.send(Notification::Disconnected).await;
    settle().await;

    assert_eq!(client.state(), LinkState::Disconnected);
    let snapshot = client.recording();
    assert_eq!(snapshot.samples.len(), 3);
    assert!(!snapshot.complete);
    assert!(matches!(
        client.start_recording().await,
        Err(HostError::NotConnected)
    ));
}

#[tokio::test(start_paused = true)]
async fn disconnect_while_waiting_for_ack() {
    let node = NodeHandle::default();
    node.0.lock().unwrap().on_start =
        Some((Duration::from_millis(100), Notification::Disconnected));
    let mut client = connected_client(&node).await;

    let started = Instant::now();
    assert!(matches!(
        client.start_recording().await,
        Err(HostError::NotConnected)
    ));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(client.state(), LinkState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn sequence_gaps_are_counted_as_dropped() {
    let node = NodeHandle::acking_after(10);
    let mut client = connected_client(&node).await;
    client.start_recording().await.unwrap();

    for id in [0u32, 1, 2, 5, 6] {
        let base = id as u16 * 30;
        node.send_packet(id, [base + 10, base + 20, base + 30]).await;
    }
    settle().await;

    let snapshot = client.stop_recording().await.unwrap();
    assert_eq!(snapshot.dropped_packets, 2);
    assert_eq!(snapshot.samples.len(), 15);
    assert!(snapshot.complete);
    assert_eq!(client.state(), LinkState::Connected);
    assert_eq!(node.writes(), vec![b"Start".to_vec(), b"Stop".to_vec()]);

    // Buffer survives Stop until the next Start
    assert_eq!(client.recording().samples.len(), 15);
}

#[tokio::test(start_paused = true)]
async fn packets_before_ack_are_ignored() {
    let node = NodeHandle::acking_after(50);
    let mut client = connected_client(&node).await;

    node.send_packet(0, [10, 20, 30]).await;
    settle().await;
    client.start_recording().await.unwrap();
    node.send_packet(0, [10, 20, 30]).await;
    settle().await;

    let snapshot = client.recording();
    assert_eq!(snapshot.samples.len(), 3);
    assert_eq!(snapshot.dropped_packets, 0);
    assert_eq!(snapshot.samples[0].timestamp_ms, 35);
}

#[tokio::test]
async fn scan_failure_returns_to_disconnected() {
    let node = NodeHandle::default();
    node.0.lock().unwrap().fail_scan = true;
    let mut client = LinkClient::new(MockTransport { node }, HostConfig::default());

    assert!(matches!(client.connect().await, Err(HostError::Transport(_))));
    assert_eq!(client.state(), LinkState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn host_disconnect_closes_link() {
    let node = NodeHandle::acking_after(10);
    let mut client = connected_client(&node).await;
    client.start_recording().await.unwrap();
    node.send_packet(0, [10, 20, 30]).await;
    settle().await;

    client.disconnect().await.unwrap();
    assert_eq!(client.state(), LinkState::Disconnected);
    assert!(!client.recording().complete);
    assert_eq!(client.recording().samples.len(), 3);

    client.connect().await.unwrap();
    assert_eq!(client.state(), LinkState::Connected);
}
