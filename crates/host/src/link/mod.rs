//! Host link client
//!
//! Owns the connection to one sensor node. A dispatcher task spawned on
//! connect drains the transport's notification channel in arrival order:
//! the ACK completes a pending Start, Data packets go to the
//! [`SessionRecorder`], and a disconnect ends the recording.
//!
//! The ACK handler starts the recorder under the same lock that resolves
//! the Start, so no Data packet that follows the ACK on the air can be
//! missed.

pub mod recorder;
pub mod state;
pub mod transport;

pub use recorder::{ClockOffset, IngestOutcome, RecordingSnapshot, SessionRecorder};
pub use state::{InvalidTransition, LinkEvent, LinkState};
pub use transport::{DeviceId, LinkTransport, Notification};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use smartpt_core::protocol::{is_ack, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::HostError;

/// A Start written and waiting for its ACK
struct PendingStart {
    sent_at: Instant,
    sent_at_utc_ms: i64,
    done: oneshot::Sender<ClockOffset>,
}

#[derive(Default)]
struct Shared {
    state: LinkState,
    recorder: SessionRecorder,
    pending_start: Option<PendingStart>,
    /// Wall clock of a Start whose ACK never came
    unacked_start_utc_ms: Option<i64>,
}

impl Shared {
    fn apply(&mut self, event: LinkEvent) -> Result<LinkState, InvalidTransition> {
        let next = self.state.transition(event)?;
        debug!(from = %self.state, to = %next, ?event, "link transition");
        self.state = next;
        Ok(next)
    }

    fn on_notification(&mut self, notification: Notification) {
        match notification {
            Notification::Ack(bytes) => self.on_ack(&bytes),
            Notification::Data(bytes) => match self.recorder.ingest(&bytes) {
                Ok(IngestOutcome::OutOfOrder) => debug!("out-of-order packet discarded"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, len = bytes.len(), "undecodable data packet"),
            },
            Notification::Disconnected => self.on_link_lost(),
        }
    }

    fn on_ack(&mut self, bytes: &[u8]) {
        if !is_ack(bytes) {
            warn!(?bytes, "unexpected value on ack characteristic");
            return;
        }
        let Some(pending) = self.pending_start.take() else {
            debug!("ack without a pending start");
            return;
        };
        let rtt = pending.sent_at.elapsed();
        if self.apply(LinkEvent::RecordingStarted).is_err() {
            warn!(state = %self.state, "ack arrived outside a connected link");
            return;
        }
        let offset = ClockOffset::from_rtt(rtt);
        self.recorder.begin(offset, true, pending.sent_at_utc_ms);
        info!(rtt_ms = rtt.as_millis() as u64, offset_ms = offset.as_ms(), "recording started");
        // The receiver is gone if start_recording already timed out
        let _ = pending.done.send(offset);
    }

    fn on_link_lost(&mut self) {
        if self.recorder.is_recording() {
            warn!(
                samples = self.recorder.snapshot().samples.len(),
                "link lost during recording"
            );
        } else {
            info!("link closed");
        }
        self.recorder.interrupt();
        self.pending_start = None;
        self.unacked_start_utc_ms = None;
        // LinkLost is valid from every state
        let _ = self.apply(LinkEvent::LinkLost);
    }
}

fn utc_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Connection to one sensor node
pub struct LinkClient<T: LinkTransport> {
    transport: T,
    config: HostConfig,
    shared: Arc<Mutex<Shared>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl<T: LinkTransport> LinkClient<T> {
    pub fn new(transport: T, config: HostConfig) -> Self {
        Self {
            transport,
            config,
            shared: Arc::new(Mutex::new(Shared::default())),
            dispatcher: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> LinkState {
        self.lock().state
    }

    /// Copy of the current or last recording
    pub fn recording(&self) -> RecordingSnapshot {
        self.lock().recorder.snapshot().clone()
    }

    /// Scan for the configured device name, connect and subscribe
    pub async fn connect(&mut self) -> Result<(), HostError> {
        self.lock().apply(LinkEvent::ScanStarted)?;
        info!(device_name = %self.config.device_name, "scanning");

        let device = match self.transport.scan(&self.config.device_name).await {
            Ok(device) => device,
            Err(e) => {
                let _ = self.lock().apply(LinkEvent::ScanFailed);
                warn!(error = %e, "scan failed");
                return Err(e);
            }
        };
        self.lock().apply(LinkEvent::DeviceFound)?;

        let notifications = match self
            .transport
            .connect(&device, self.config.notification_buffer)
            .await
        {
            Ok(rx) => rx,
            Err(e) => {
                let _ = self.lock().apply(LinkEvent::ConnectFailed);
                warn!(device = %device.0, error = %e, "connect failed");
                return Err(e);
            }
        };
        self.lock().apply(LinkEvent::Established)?;
        info!(device = %device.0, "connected");

        if let Some(old) = self.dispatcher.take() {
            old.abort();
        }
        self.dispatcher = Some(tokio::spawn(dispatch(
            notifications,
            Arc::clone(&self.shared),
        )));
        Ok(())
    }

    /// Write Start and wait for the ACK
    ///
    /// Returns the clock offset derived from the round trip. The previous
    /// recording is discarded. On [`HostError::AckTimeout`] the link stays
    /// connected and [`accept_unsynchronized`](Self::accept_unsynchronized)
    /// can continue without a clock offset.
    pub async fn start_recording(&mut self) -> Result<ClockOffset, HostError> {
        let (done, ack) = oneshot::channel();
        {
            let mut shared = self.lock();
            match shared.state {
                LinkState::Connected => {}
                LinkState::Recording => return Err(HostError::AlreadyRecording),
                _ => return Err(HostError::NotConnected),
            }
            shared.recorder.reset();
            shared.unacked_start_utc_ms = None;
            shared.pending_start = Some(PendingStart {
                sent_at: Instant::now(),
                sent_at_utc_ms: utc_now_ms(),
                done,
            });
        }

        if let Err(e) = self.transport.write_status(Command::Start.as_bytes()).await {
            self.lock().pending_start = None;
            return Err(e);
        }
        debug!("start written, waiting for ack");

        match timeout(self.config.ack_timeout(), ack).await {
            Ok(Ok(offset)) => Ok(offset),
            // Sender dropped: the link went down before the ACK
            Ok(Err(_)) => Err(HostError::NotConnected),
            Err(_) => {
                let mut shared = self.lock();
                if let Some(pending) = shared.pending_start.take() {
                    shared.unacked_start_utc_ms = Some(pending.sent_at_utc_ms);
                    warn!(timeout_ms = self.config.ack_timeout_ms, "no ack from node");
                    Err(HostError::AckTimeout(self.config.ack_timeout_ms))
                } else if shared.state == LinkState::Recording {
                    // The ACK landed between the deadline and this lock
                    Ok(shared.recorder.clock_offset())
                } else {
                    Err(HostError::NotConnected)
                }
            }
        }
    }

    /// Record without a clock offset after an ACK timeout
    ///
    /// The node is assumed to have received the timed-out Start, so the
    /// session is placed at the time that Start was written. Timestamps are
    /// the node's own offsets.
    pub fn accept_unsynchronized(&mut self) -> Result<(), HostError> {
        let mut shared = self.lock();
        match shared.state {
            LinkState::Connected => {}
            LinkState::Recording => return Err(HostError::AlreadyRecording),
            _ => return Err(HostError::NotConnected),
        }
        shared.pending_start = None;
        let started_at = shared
            .unacked_start_utc_ms
            .take()
            .unwrap_or_else(utc_now_ms);
        shared.recorder.begin(ClockOffset::ZERO, false, started_at);
        shared.apply(LinkEvent::RecordingStarted)?;
        warn!("recording without clock synchronization");
        Ok(())
    }

    /// Write Stop and end the recording
    ///
    /// The buffer is kept until the next Start. It is closed locally even if
    /// the write fails.
    pub async fn stop_recording(&mut self) -> Result<RecordingSnapshot, HostError> {
        let snapshot = {
            let mut shared = self.lock();
            if shared.state != LinkState::Recording {
                return Err(HostError::NotRecording);
            }
            shared.recorder.finish();
            shared.apply(LinkEvent::RecordingStopped)?;
            shared.recorder.snapshot().clone()
        };
        info!(
            samples = snapshot.samples.len(),
            dropped = snapshot.dropped_packets,
            "recording stopped"
        );
        self.transport.write_status(Command::Stop.as_bytes()).await?;
        Ok(snapshot)
    }

    /// Close the link; a recording in progress is kept as incomplete
    pub async fn disconnect(&mut self) -> Result<(), HostError> {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
        self.lock().on_link_lost();
        self.transport.disconnect().await
    }
}

impl<T: LinkTransport> Drop for LinkClient<T> {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }
    }
}

async fn dispatch(mut notifications: mpsc::Receiver<Notification>, shared: Arc<Mutex<Shared>>) {
    while let Some(notification) = notifications.recv().await {
        let lost = notification == Notification::Disconnected;
        shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_notification(notification);
        if lost {
            return;
        }
    }
    // Transport closed the channel without saying why
    shared
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .on_link_lost();
}
