//! Network inference stream
//!
//! The pose-inference service streams one result per analysed frame while
//! the session records. After Stop the collector waits a bounded time for
//! the tail of the stream, then hands over whatever arrived.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smartpt_core::align::Timestamped;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// UTC milliseconds of the analysed frame
    pub timestamp_utc_ms: i64,
    /// Opaque result string forwarded to the backend
    pub result: String,
}

impl Timestamped for InferenceResult {
    fn timestamp_utc_ms(&self) -> i64 {
        self.timestamp_utc_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceEvent {
    Result(InferenceResult),
    /// The service has sent everything for this session
    Finished,
}

/// Results gathered for one session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InferenceCollection {
    pub results: Vec<InferenceResult>,
    /// The wait ended before the stream finished
    pub timed_out: bool,
}

pub struct InferenceCollector {
    events: mpsc::Receiver<InferenceEvent>,
    results: Vec<InferenceResult>,
    finished: bool,
}

impl InferenceCollector {
    pub fn new(events: mpsc::Receiver<InferenceEvent>) -> Self {
        Self {
            events,
            results: Vec::new(),
            finished: false,
        }
    }

    /// Collector plus the sender the inference client feeds
    pub fn channel(buffer: usize) -> (mpsc::Sender<InferenceEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }

    pub fn received(&self) -> usize {
        self.results.len()
    }

    /// Take whatever is already queued without waiting
    pub fn poll_ready(&mut self) {
        while !self.finished {
            match self.events.try_recv() {
                Ok(event) => self.accept(event),
                Err(_) => break,
            }
        }
    }

    fn accept(&mut self, event: InferenceEvent) {
        match event {
            InferenceEvent::Result(result) => self.results.push(result),
            InferenceEvent::Finished => self.finished = true,
        }
    }

    /// Wait up to `wait` for the rest of the stream
    ///
    /// A closed channel counts as finished.
    pub async fn finish(mut self, wait: Duration) -> InferenceCollection {
        self.poll_ready();
        let timed_out = if self.finished {
            false
        } else {
            let events = &mut self.events;
            let results = &mut self.results;
            let drain = async {
                while let Some(event) = events.recv().await {
                    match event {
                        InferenceEvent::Result(result) => results.push(result),
                        InferenceEvent::Finished => return,
                    }
                }
            };
            timeout(wait, drain).await.is_err()
        };

        if timed_out {
            warn!(
                received = self.results.len(),
                wait_ms = wait.as_millis() as u64,
                "inference results incomplete, continuing with partial set"
            );
        } else {
            debug!(received = self.results.len(), "inference stream finished");
        }
        InferenceCollection {
            results: self.results,
            timed_out,
        }
    }
}
