//! Backend submission
//!
//! After a session the video, the frame-aligned inference results and the
//! per-sample sensor records are sent to the analysis backend as one
//! multipart form. The backend fuses the camera estimate with the gyro
//! integration and returns joint angles per frame.
//!
//! | Field              | Content                                        |
//! |--------------------|------------------------------------------------|
//! | `video`            | the recorded video file                        |
//! | `overshoot_data`   | JSON `[[frame_index, result], ...]`            |
//! | `sensor_data`      | JSON array of [`SensorRecord`]                 |
//! | `video_start_time` | UTC milliseconds of the first frame            |
//! | `joint_index`      | which joint the session measured               |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smartpt_core::align::{FrameTimeline, Timestamped, VideoMetadata};
use smartpt_core::imu::PhysicalSample;
use tracing::{debug, info};

use crate::error::HostError;
use crate::link::RecordingSnapshot;
use crate::results::InferenceResult;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for Axes {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One IMU sample as the backend expects it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp_utc_ms: i64,
    /// Video frame the sample falls on
    pub frame_index: u32,
    /// Angular rate of sensor A in °/s
    pub gyro_a: Axes,
    /// Angular rate of sensor B in °/s
    pub gyro_b: Axes,
}

/// A recorded sample placed on the UTC timeline
#[derive(Debug, Clone, Copy)]
struct UtcSample<'a> {
    timestamp_utc_ms: i64,
    sample: &'a PhysicalSample,
}

impl Timestamped for UtcSample<'_> {
    fn timestamp_utc_ms(&self) -> i64 {
        self.timestamp_utc_ms
    }
}

/// Everything the backend needs for one session
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSubmission {
    pub video_start_utc_ms: i64,
    pub joint_index: u8,
    pub inference_pairs: Vec<(u32, String)>,
    pub sensor_records: Vec<SensorRecord>,
}

impl AnalysisSubmission {
    /// Align both streams onto the video frames
    ///
    /// Events outside the video window (with `tolerance_ms` slack) are
    /// dropped. Fails if the video has no start timestamp.
    pub fn build(
        video: &VideoMetadata,
        inference: &[InferenceResult],
        snapshot: &RecordingSnapshot,
        joint_index: u8,
        tolerance_ms: u64,
    ) -> Result<Self, HostError> {
        let timeline = FrameTimeline::new(video, tolerance_ms)?;
        // Checked by FrameTimeline::new
        let video_start_utc_ms = video.start_utc_ms.unwrap_or_default();

        let inference_pairs: Vec<(u32, String)> = timeline
            .align(inference)
            .map(|record| (record.frame_index, record.payload.result.clone()))
            .collect();

        let sensor_records: Vec<SensorRecord> = match snapshot.started_at_utc_ms {
            Some(started_at) => {
                let utc = snapshot.samples.iter().map(|sample| UtcSample {
                    timestamp_utc_ms: started_at + sample.timestamp_ms as i64,
                    sample,
                });
                timeline
                    .align(utc)
                    .map(|record| SensorRecord {
                        timestamp_utc_ms: record.payload.timestamp_utc_ms,
                        frame_index: record.frame_index,
                        gyro_a: record.payload.sample.sensor_a.gyro_dps.into(),
                        gyro_b: record.payload.sample.sensor_b.gyro_dps.into(),
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        info!(
            frames = video.total_frames,
            inference = inference_pairs.len(),
            inference_dropped = inference.len() - inference_pairs.len(),
            sensor = sensor_records.len(),
            sensor_dropped = snapshot.samples.len() - sensor_records.len(),
            "aligned session"
        );
        Ok(Self {
            video_start_utc_ms,
            joint_index,
            inference_pairs,
            sensor_records,
        })
    }

    pub fn inference_pairs_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(&self.inference_pairs)?)
    }

    pub fn sensor_records_json(&self) -> Result<String, HostError> {
        Ok(serde_json::to_string(&self.sensor_records)?)
    }

    /// Text fields of the multipart body; the video goes alongside as a file part
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, HostError> {
        let fields = vec![
            ("overshoot_data", self.inference_pairs_json()?),
            ("sensor_data", self.sensor_records_json()?),
            ("video_start_time", self.video_start_utc_ms.to_string()),
            ("joint_index", self.joint_index.to_string()),
        ];
        debug!(count = fields.len(), "form fields serialized");
        Ok(fields)
    }
}

/// Analysis result; `None` marks a frame without an estimate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub fused_angles: Vec<Option<f64>>,
    pub raw_angles: Vec<Option<f64>>,
    #[serde(default)]
    pub anomalous_frames: Vec<u32>,
}

impl AnalysisResponse {
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// HTTP side of the analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Upload the video file and form fields, return the parsed response.
    async fn submit(
        &self,
        video_path: &std::path::Path,
        submission: &AnalysisSubmission,
    ) -> Result<AnalysisResponse, HostError>;
}
