//! smartpt_host - Host side of the SmartPT motion tracker
//!
//! Connects to a sensor node, measures the clock offset at Start, collects
//! and reconstructs the telemetry stream, then aligns it with the video and
//! the network inference stream for submission to the analysis backend.
//!
//! The radio and the HTTP client are external collaborators behind
//! [`LinkTransport`] and [`AnalysisBackend`].

pub mod config;
pub mod error;
pub mod link;
pub mod results;
pub mod submission;

pub use config::HostConfig;
pub use error::HostError;
pub use link::{
    ClockOffset, DeviceId, LinkClient, LinkEvent, LinkState, LinkTransport, Notification,
    RecordingSnapshot, SessionRecorder,
};
pub use results::{InferenceCollection, InferenceCollector, InferenceEvent, InferenceResult};
pub use submission::{AnalysisBackend, AnalysisResponse, AnalysisSubmission, SensorRecord};
