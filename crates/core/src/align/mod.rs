//! Stream alignment onto the video frame timeline
//!
//! Video frames, network inference results and IMU samples are produced by
//! independent clocks at independent rates. The aligner maps each event's
//! UTC timestamp to the index of the video frame it belongs to.
//!
//! The mapping is:
//!
//! ```text
//! offset = timestamp - video_start
//! discard if offset < -tolerance or offset > duration + tolerance
//! frame  = clamp(round(offset * fps / 1000), 0, total_frames - 1)
//! ```
//!
//! It is many-to-one (several events can share a frame), sparse (frames
//! without events get no record), and order preserving within one input
//! stream.
//!
//! # Usage
//!
//! ```
//! use smartpt_core::align::{FrameTimeline, VideoMetadata, DEFAULT_TOLERANCE_MS};
//!
//! let video = VideoMetadata::from_duration(Some(1000), 30.0, 2000);
//! let timeline = FrameTimeline::new(&video, DEFAULT_TOLERANCE_MS).unwrap();
//! assert_eq!(timeline.frame_index(1033), Some(1));
//! assert_eq!(timeline.frame_index(500), None);
//! ```

use core::fmt;

/// Jitter allowance around the recording window (capture and network)
pub const DEFAULT_TOLERANCE_MS: u64 = 100;

/// Alignment errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlignError {
    /// The recording has no video start timestamp
    MissingVideoStart,
    /// Frame rate is zero, negative or not finite
    InvalidFrameRate,
    /// The video has no frames
    EmptyVideo,
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::MissingVideoStart => write!(f, "video start timestamp is unavailable"),
            AlignError::InvalidFrameRate => write!(f, "video frame rate must be positive"),
            AlignError::EmptyVideo => write!(f, "video has no frames"),
        }
    }
}

/// Timing metadata of the recorded video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    /// UTC milliseconds of the first frame, if the camera reported it
    pub start_utc_ms: Option<i64>,
    pub fps: f64,
    pub duration_ms: u64,
    pub total_frames: u32,
}

impl VideoMetadata {
    /// Derive the frame count from duration and frame rate
    pub fn from_duration(start_utc_ms: Option<i64>, fps: f64, duration_ms: u64) -> Self {
        let frames = if fps.is_finite() && fps > 0.0 {
            libm::round(duration_ms as f64 * fps / 1000.0) as u32
        } else {
            0
        };
        Self {
            start_utc_ms,
            fps,
            duration_ms,
            total_frames: frames,
        }
    }
}

/// An event carrying a UTC timestamp in milliseconds
pub trait Timestamped {
    fn timestamp_utc_ms(&self) -> i64;
}

impl<T: Timestamped> Timestamped for &T {
    fn timestamp_utc_ms(&self) -> i64 {
        (**self).timestamp_utc_ms()
    }
}

/// An event placed on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentRecord<T> {
    pub frame_index: u32,
    pub payload: T,
}

/// Validated video timeline ready for mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTimeline {
    start_utc_ms: i64,
    fps: f64,
    duration_ms: i64,
    last_frame: u32,
    tolerance_ms: i64,
}

impl FrameTimeline {
    /// Validate the metadata
    ///
    /// A missing start timestamp is an error rather than "now": guessing
    /// would silently shift every event.
    pub fn new(video: &VideoMetadata, tolerance_ms: u64) -> Result<Self, AlignError> {
        let start_utc_ms = video.start_utc_ms.ok_or(AlignError::MissingVideoStart)?;
        if !video.fps.is_finite() || video.fps <= 0.0 {
            return Err(AlignError::InvalidFrameRate);
        }
        if video.total_frames == 0 {
            return Err(AlignError::EmptyVideo);
        }
        Ok(Self {
            start_utc_ms,
            fps: video.fps,
            duration_ms: video.duration_ms.min(i64::MAX as u64) as i64,
            last_frame: video.total_frames - 1,
            tolerance_ms: tolerance_ms.min(i64::MAX as u64) as i64,
        })
    }

    /// Frame index for a UTC timestamp, or `None` outside the window
    pub fn frame_index(&self, timestamp_utc_ms: i64) -> Option<u32> {
        let offset_ms = timestamp_utc_ms.saturating_sub(self.start_utc_ms);
        if offset_ms < -self.tolerance_ms
            || offset_ms > self.duration_ms.saturating_add(self.tolerance_ms)
        {
            return None;
        }
        let frame = libm::round(offset_ms as f64 * self.fps / 1000.0);
        if frame <= 0.0 {
            Some(0)
        } else if frame >= self.last_frame as f64 {
            Some(self.last_frame)
        } else {
            Some(frame as u32)
        }
    }

    /// Map a time-ordered stream, dropping events outside the window
    pub fn align<I>(&self, items: I) -> impl Iterator<Item = AlignmentRecord<I::Item>>
    where
        I: IntoIterator,
        I::Item: Timestamped,
    {
        let timeline = *self;
        items.into_iter().filter_map(move |payload| {
            timeline
                .frame_index(payload.timestamp_utc_ms())
                .map(|frame_index| AlignmentRecord {
                    frame_index,
                    payload,
                })
        })
    }
}
