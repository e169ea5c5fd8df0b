use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::domain::face_matcher::FaceMatch;
use crate::shared::face_box::FaceBox;

/// A sampled frame in which the person was found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub frame_index: usize,
    pub timestamp: f64,
    /// First matched face of the frame, in detection order.
    pub face_box: FaceBox,
}

/// Final result of a completed scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Every raw frame decoded, sampled or not.
    pub total_frames_read: usize,
    /// Frames written to the output video.
    pub sampled_frame_count: usize,
    /// Sampled frames with at least one match. Counts frames, not faces.
    pub detected_frame_count: usize,
    pub detection_timestamps: Vec<f64>,
    pub detections: Vec<DetectionEvent>,
    pub output_video_path: PathBuf,
    pub detection_snapshot_path: Option<PathBuf>,
    pub output_codec: Option<String>,
}

/// What observing one sampled frame amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    NoMatch,
    Detected,
    /// First detected frame of the run; the snapshot is taken from it.
    FirstDetection,
}

/// Running tally of a scan, fed one sampled frame at a time in processing
/// order.
#[derive(Debug)]
pub struct DetectionAggregator {
    output_video_path: PathBuf,
    sampled_frame_count: usize,
    events: Vec<DetectionEvent>,
    snapshot_path: Option<PathBuf>,
}

impl DetectionAggregator {
    pub fn new(output_video_path: impl Into<PathBuf>) -> Self {
        Self {
            output_video_path: output_video_path.into(),
            sampled_frame_count: 0,
            events: Vec::new(),
            snapshot_path: None,
        }
    }

    pub fn observe(
        &mut self,
        frame_index: usize,
        timestamp: f64,
        matches: &[FaceMatch],
    ) -> FrameOutcome {
        self.sampled_frame_count += 1;

        let Some(first) = matches.iter().find(|m| m.is_match()) else {
            return FrameOutcome::NoMatch;
        };

        let is_first = self.events.is_empty();
        self.events.push(DetectionEvent {
            frame_index,
            timestamp,
            face_box: first.observation.face_box,
        });

        if is_first {
            FrameOutcome::FirstDetection
        } else {
            FrameOutcome::Detected
        }
    }

    /// Records where the first-detection still went. Only the first call
    /// has any effect.
    pub fn record_snapshot(&mut self, path: &Path) {
        if self.snapshot_path.is_none() {
            self.snapshot_path = Some(path.to_path_buf());
        } else {
            log::debug!("Snapshot already recorded; ignoring {}", path.display());
        }
    }

    pub fn finalize(
        self,
        total_frames_read: usize,
        output_codec: Option<String>,
    ) -> DetectionSummary {
        DetectionSummary {
            total_frames_read,
            sampled_frame_count: self.sampled_frame_count,
            detected_frame_count: self.events.len(),
            detection_timestamps: self.events.iter().map(|e| e.timestamp).collect(),
            detections: self.events,
            output_video_path: self.output_video_path,
            detection_snapshot_path: self.snapshot_path,
            output_codec,
        }
    }
}
