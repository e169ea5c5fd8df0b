use std::path::PathBuf;

/// Geometry and rate of a video source, read once when it is opened.
///
/// `total_frames` is whatever the container reports and may be an estimate;
/// the scan never relies on it for counting.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

/// Presentation time in seconds of the frame at `index`: `index / fps`,
/// or 0.0 when the source reports no usable rate.
pub fn frame_timestamp(index: usize, fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        index as f64 / fps
    } else {
        0.0
    }
}
